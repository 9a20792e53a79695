use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use getset::ast::AstPrinter;
use getset::codegen::attribute::{find_attribute, CodeAttribute};
use getset::codegen::bytecode::{access_flags, describe_member_flags};
use getset::codegen::defs::attribute_names;
use getset::codegen::frame::{describe_stack_map_frames, StackMapTable};
use getset::codegen::reader::disassemble;
use getset::codegen::{ClassFile, ConstantPool};
use getset::common::{ImportTable, TypeCatalog, TypeResolver};
use getset::Config;

#[derive(Parser)]
#[command(name = "gsc")]
#[command(about = "Compiles attribute declarations into JVM class files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a declaration file to a .class file
    Compile {
        /// Input declaration file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory (defaults to the input's directory)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,

        /// Class file major version
        #[arg(long, value_name = "N")]
        target: Option<u16>,

        /// Skip class file verification
        #[arg(long)]
        no_verify: bool,

        /// Extra qualified type name to accept (repeatable)
        #[arg(long = "known-type", value_name = "TYPE")]
        known_types: Vec<String>,
    },

    /// Parse a declaration file and show the directives
    Parse {
        /// Input declaration file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Show the parsed structure
        #[arg(short, long)]
        detailed: bool,
    },

    /// Resolve a type expression to its descriptor and signature
    Resolve {
        /// Type expression, e.g. `Map<String,List<T>>[]`
        #[arg(value_name = "TYPE")]
        expr: String,

        /// Imported qualified name (repeatable)
        #[arg(long = "import", value_name = "FQN")]
        imports: Vec<String>,

        /// Generic parameter of the enclosing class (repeatable)
        #[arg(long = "param", value_name = "P")]
        params: Vec<String>,
    },

    /// Show a summary of a compiled class file
    Inspect {
        /// Input .class file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Also list the constant pool
        #[arg(short, long)]
        constants: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Compile { verbose: true, .. });
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    match cli.command {
        Commands::Compile { input, output, verbose, target, no_verify, known_types } => {
            let mut config = Config::default().with_env_known_types();
            if let Some(target) = target {
                config.major_version = target;
            }
            config.verify = !no_verify;
            config.known_types.extend(known_types);
            compile_file(&input, output.as_deref(), verbose, &config)?;
        }
        Commands::Parse { input, detailed } => {
            parse_file(&input, detailed)?;
        }
        Commands::Resolve { expr, imports, params } => {
            resolve_type(&expr, &imports, &params)?;
        }
        Commands::Inspect { input, constants } => {
            inspect_file(&input, constants)?;
        }
    }

    Ok(())
}

fn compile_file(input: &Path, output: Option<&Path>, verbose: bool, config: &Config) -> Result<()> {
    if verbose {
        println!("Compiling {}...", input.display());
    }

    let written = match output {
        Some(dir) => getset::compile_file_into(input, dir, config),
        None => getset::compile_file(input, config),
    }
    .with_context(|| format!("failed to compile {}", input.display()))?;

    if verbose {
        println!("Compilation successful! Output: {}", written.display());
    }
    Ok(())
}

fn parse_file(input: &Path, detailed: bool) -> Result<()> {
    let source = fs::read_to_string(input).with_context(|| format!("failed to read {}", input.display()))?;
    let unit = getset::parser::parse_source(&source)?;

    if detailed {
        println!("{:#?}", unit);
    } else {
        print!("{}", AstPrinter::new().print(&unit));
    }
    Ok(())
}

fn resolve_type(expr: &str, imports: &[String], params: &[String]) -> Result<()> {
    let imports: ImportTable = imports.iter().map(String::as_str).collect();
    let universe = TypeCatalog::platform();
    let resolver = TypeResolver::new(&imports, params, universe);
    let resolved = resolver.resolve(expr, true)?;

    println!("descriptor: {}", resolved.descriptor);
    match &resolved.signature {
        Some(signature) => println!("signature:  {}", signature),
        None => println!("signature:  (none)"),
    }
    Ok(())
}

fn inspect_file(input: &Path, constants: bool) -> Result<()> {
    let bytes = fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
    let class_file = ClassFile::parse(&bytes).with_context(|| format!("{} is not a class file", input.display()))?;
    let pool = &class_file.constant_pool;

    let name = class_file.this_class_name().ok_or_else(|| anyhow!("this_class is not a class constant"))?;
    println!("class {} (version {}.{})", name, class_file.major_version, class_file.minor_version);
    println!("  flags: {}", describe_class_flags(class_file.access_flags));
    println!("  extends {}", class_file.super_class_name().unwrap_or("<none>"));
    if let Some(signature) = utf8_attribute(pool, &class_file.attributes, attribute_names::SIGNATURE) {
        println!("  signature: {}", signature);
    }
    if let Some(source_file) = utf8_attribute(pool, &class_file.attributes, attribute_names::SOURCE_FILE) {
        println!("  source: {}", source_file);
    }

    if constants {
        println!();
        println!("Constant pool ({} slots):", pool.count() - 1);
        for (index, constant) in pool.iter() {
            println!("  #{:<4} {:?}", index, constant);
        }
    }

    for field in &class_file.fields {
        println!();
        let descriptor = pool.utf8(field.descriptor_index).unwrap_or("?");
        println!(
            "{} {} : {}",
            describe_member_flags(field.access_flags).join(" "),
            class_file.field_name(field).unwrap_or("?"),
            descriptor
        );
        if let Some(signature) = utf8_attribute(pool, &field.attributes, attribute_names::SIGNATURE) {
            println!("  signature: {}", signature);
        }
    }

    for method in &class_file.methods {
        println!();
        println!(
            "{} {}{}",
            describe_member_flags(method.access_flags).join(" "),
            class_file.method_name(method).unwrap_or("?"),
            pool.utf8(method.descriptor_index).unwrap_or("?")
        );
        if let Some(signature) = utf8_attribute(pool, &method.attributes, attribute_names::SIGNATURE) {
            println!("  signature: {}", signature);
        }
        let Some(code) = find_attribute(&method.attributes, pool, attribute_names::CODE) else {
            continue;
        };
        let code = CodeAttribute::parse(&code.info)?;
        println!("  Code: max_stack={}, max_locals={}", code.max_stack, code.max_locals);
        for line in disassemble(&code.code, pool)? {
            println!("    {}", line);
        }
        if let Some(frames) = find_attribute(&code.attributes, pool, attribute_names::STACK_MAP_TABLE) {
            println!("  StackMapTable:");
            for line in describe_stack_map_frames(&StackMapTable::parse(&frames.info)?) {
                println!("    {}", line);
            }
        }
    }
    Ok(())
}

fn describe_class_flags(flags: u16) -> String {
    let table = [
        (access_flags::ACC_PUBLIC, "public"),
        (access_flags::ACC_FINAL, "final"),
        (access_flags::ACC_SUPER, "super"),
        (access_flags::ACC_INTERFACE, "interface"),
        (access_flags::ACC_ABSTRACT, "abstract"),
    ];
    let names: Vec<&str> = table.iter().filter(|(bit, _)| flags & bit != 0).map(|(_, name)| *name).collect();
    format!("0x{:04x} ({})", flags, names.join(" "))
}

/// Text of a single-index attribute such as `Signature` or `SourceFile`
fn utf8_attribute<'a>(
    pool: &'a ConstantPool,
    attributes: &[getset::codegen::attribute::AttributeInfo],
    name: &str,
) -> Option<&'a str> {
    let attribute = find_attribute(attributes, pool, name)?;
    match attribute.info.as_slice() {
        [high, low] => pool.utf8(u16::from_be_bytes([*high, *low])),
        _ => None,
    }
}
