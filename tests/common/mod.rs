use std::io;
use std::path::Path;

/// Writes an HTML fixture file with the given body wrapped in a minimal
/// document shell.
pub fn write_fixture(path: &Path, body: &str) -> io::Result<()> {
    std::fs::write(
        path,
        format!("<!DOCTYPE html><html><head><title>fixture</title></head><body>{body}</body></html>"),
    )
}

/// A named table with a header row and one anchor-bearing data row.
pub const PEOPLE_TABLE: &str = "<h2>People: 2026</h2>\
     <table>\
       <tr><th>Name</th><th>Link</th></tr>\
       <tr><td>Alice</td><td><a href=\"http://x\">Profile</a></td></tr>\
     </table>";

/// A table with no header cells at all.
pub const BARE_TABLE: &str = "<table>\
       <tr><td>1</td><td>2</td></tr>\
       <tr><td>3</td><td>4</td></tr>\
     </table>";
