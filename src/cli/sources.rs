use crate::quote::SourceRegistry;

/// One line listing the quoted source names.
pub fn format_sources(registry: &SourceRegistry) -> String {
    let names: Vec<String> = registry.names().iter().map(|n| format!("{:?}", n)).collect();
    format!("Available sources: {}", names.join(", "))
}

pub fn execute(registry: &SourceRegistry) {
    println!("{}", format_sources(registry));
}
