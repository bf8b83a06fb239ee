//! Build script that records build information for the program metadata.
fn main() {
    built::write_built_file().expect("Failed to acquire build-time information");
}
