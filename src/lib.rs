//! getset: attribute-declaration compiler
//!
//! Compiles a small line-oriented declaration language straight into JVM class
//! files. Each class gets a default constructor, one private field per
//! attribute and a getter/setter pair, optionally rejecting `null` on set.
//!
//! ## Architecture
//!
//! - **parser**: turns source lines into a [`CompilationUnit`](ast::CompilationUnit)
//! - **common**: configuration, errors, imports and the type resolver
//! - **codegen**: class assembly, class file encoding and decoding
//! - **verify**: structural checks over the encoded class file
//! - **bin**: command-line interface (`gsc`)
//!
//! ## Compilation Flow
//!
//! ```text
//! source → Parser → CompilationUnit → TypeResolver → ClassAssembler → ClassModel → encode → bytes
//!                                                                                    ↓
//!                                                                                 verify
//! ```

pub mod ast;
pub mod codegen;
pub mod common;
pub mod consts;
pub mod parser;
pub mod verify;

pub use common::{Config, Error, Result};

use std::path::{Path, PathBuf};

use codegen::{AttributeSpec, ClassAssembler};
use common::{ImportTable, TypeCatalog, TypeResolver};

/// Compile declaration source to class file bytes without touching the filesystem
///
/// `source_name` becomes the `SourceFile` attribute when given.
pub fn compile(source: &str, source_name: Option<&str>, config: &Config) -> Result<Vec<u8>> {
    config.validate()?;

    let unit = parser::parse_source(source)?;
    log::debug!(
        "parsed {} ({} imports, {} attributes)",
        unit.qualified_class_name(),
        unit.imports.len(),
        unit.attributes.len()
    );

    let imports: ImportTable = unit.imports.iter().map(|import| import.name.as_str()).collect();
    let universe = TypeCatalog::platform_with(config.known_types.iter().cloned());
    let resolver = TypeResolver::new(&imports, &unit.class.type_params, &universe);

    let mut assembler = ClassAssembler::begin(&unit.qualified_class_name(), &unit.class.type_params, source_name);
    for attribute in &unit.attributes {
        let resolved = resolver
            .resolve(&attribute.type_expr, true)
            .map_err(|e| e.at_line(attribute.line))?;
        log::debug!("line {}: {} -> {}", attribute.line, attribute.name, resolved.generic_form());
        assembler
            .add_attribute(AttributeSpec {
                name: attribute.name.clone(),
                descriptor: resolved.descriptor,
                signature: resolved.signature,
                constraint: attribute.constraint,
            })
            .map_err(|e| e.at_line(attribute.line))?;
    }
    let model = assembler.finish();
    log::debug!("assembled {} ({} methods)", model.internal_name, model.methods.len());

    codegen::encode(&model, config)
}

/// Compile a source file and write the class next to it
///
/// `IntHolder.gs` becomes `IntHolder.class`. Nothing is written when the
/// compile fails.
pub fn compile_file(path: &Path, config: &Config) -> Result<PathBuf> {
    let output = path.with_extension(consts::CLASS_FILE_EXTENSION);
    compile_to(path, &output, config)
}

/// Compile a source file and write the class into `output_dir`
pub fn compile_file_into(path: &Path, output_dir: &Path, config: &Config) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::config_error(format!("not a file path: {}", path.display())))?;
    let output = output_dir.join(file_name).with_extension(consts::CLASS_FILE_EXTENSION);
    std::fs::create_dir_all(output_dir)?;
    compile_to(path, &output, config)
}

fn compile_to(path: &Path, output: &Path, config: &Config) -> Result<PathBuf> {
    log::info!("compiling {}", path.display());
    let source = std::fs::read_to_string(path)?;
    let source_name = path.file_name().and_then(|name| name.to_str());
    let bytes = compile(&source, source_name, config)?;
    std::fs::write(output, &bytes)?;
    log::info!("wrote {} ({} bytes)", output.display(), bytes.len());
    Ok(output.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_int_holder() {
        let bytes = compile(">> pkg1\nIntHolder\nvalue : int\n", Some("IntHolder.gs"), &Config::default()).unwrap();
        assert_eq!(&bytes[0..4], &[0xCA, 0xFE, 0xBA, 0xBE]);
    }

    #[test]
    fn test_resolution_errors_carry_the_line() {
        let err = compile(">> pkg1\nHolder\n\nthing : Unknown\n", None, &Config::default()).unwrap_err();
        assert!(matches!(err, Error::UnresolvedType { line: 4, .. }));
    }

    #[test]
    fn test_invalid_config_is_rejected_first() {
        let config = Config { major_version: 40, ..Config::default() };
        assert!(matches!(compile("garbage", None, &config), Err(Error::Config { .. })));
    }
}
