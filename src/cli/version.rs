/// Display version information
pub fn execute() {
    println!("nodeops {}", env!("CARGO_PKG_VERSION"));
    println!("Operator tools for a Namada node: proposal, artifacts, diagnostics");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_execute() {
        // Version command should not panic
        execute();
    }
}
