use super::nodes::*;

/// Renders a compilation unit back into declaration syntax, annotated with line numbers
pub struct AstPrinter {
    output: String,
}

impl AstPrinter {
    pub fn new() -> Self {
        Self { output: String::new() }
    }

    pub fn print(&mut self, unit: &CompilationUnit) -> String {
        self.output.clear();
        self.line(unit.package.line, &unit.package.to_string());
        for import in &unit.imports {
            self.line(import.line, &import.to_string());
        }
        self.line(unit.class.line, &unit.class.to_string());
        for attribute in &unit.attributes {
            self.line(attribute.line, &format!("  {}", attribute));
        }
        self.output.clone()
    }

    fn line(&mut self, number: usize, text: &str) {
        self.output.push_str(&format!("{:>4} | {}\n", number, text));
    }
}

impl Default for AstPrinter {
    fn default() -> Self {
        Self::new()
    }
}
