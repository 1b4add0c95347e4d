use clap::{Parser, Subcommand, ValueEnum};
use docsql::{parse_definitions, SchemaBundle, StaticColumns};
use std::collections::BTreeMap;
use std::process;

type Bundles = Vec<(String, SchemaBundle<StaticColumns>)>;

/// docsql: compile document type definitions into provisioning SQL
#[derive(Parser)]
#[command(name = "docsql", version, about)]
struct Cli {
    /// Definition file or glob (e.g. "schemas/*.yaml")
    schema: Option<String>,

    /// Only compile this document type
    #[arg(long)]
    document: Option<String>,

    /// Output format
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Yaml,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Print creation statements
    Create,

    /// Print drop statements
    Drop,

    /// Print grant statements
    Grant {
        /// Role or user receiving read access
        #[arg(long)]
        grantee: String,
    },

    /// Print the parameterized insert statement
    Insert,

    /// Print the truncate statement
    Truncate,

    /// Print every compiled statement and the object registry
    Bundle,

    /// Print the path to column mapping of every projection view
    Metadata,

    /// Tell whether a vendor error code can be ignored
    Classify {
        /// Numeric vendor code or PostgreSQL SQLSTATE (e.g. 955, 42P07)
        #[arg(long)]
        code: String,
        /// Classify for a drop (object expected to be missing) instead of a create
        #[arg(long)]
        missing: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("ERROR:{e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let bundles = match &cli.command {
        Command::Classify { .. } => Vec::new(),
        _ => {
            let pattern = cli.schema.as_deref().ok_or("No definition file given")?;
            load(pattern, cli.document.as_deref())?
        }
    };

    match cli.command {
        Command::Create => {
            print_statements(&collect(&bundles, |b| b.creation().to_vec()), cli.format)?;
        }
        Command::Drop => {
            print_statements(&collect(&bundles, |b| b.drops().to_vec()), cli.format)?;
        }
        Command::Grant { grantee } => {
            print_statements(&collect(&bundles, |b| b.grants(&grantee)), cli.format)?;
        }
        Command::Insert => {
            print_statements(&collect(&bundles, |b| vec![b.insert().to_string()]), cli.format)?;
        }
        Command::Truncate => {
            print_statements(&collect(&bundles, |b| vec![b.truncate().to_string()]), cli.format)?;
        }
        Command::Bundle => match cli.format {
            OutputFormat::Text => {
                for (name, bundle) in &bundles {
                    println!("-- {name}: creation");
                    print_sql(bundle.creation());
                    println!("-- {name}: drop");
                    print_sql(bundle.drops());
                    println!("-- {name}: grant");
                    print_sql(bundle.grant_templates());
                    println!("-- {name}: insert");
                    print_sql(&[bundle.insert().to_string()]);
                    println!("-- {name}: truncate");
                    print_sql(&[bundle.truncate().to_string()]);
                }
            }
            format => {
                let map: BTreeMap<&str, &SchemaBundle<StaticColumns>> =
                    bundles.iter().map(|(name, bundle)| (name.as_str(), bundle)).collect();
                print_output(&serde_json::to_value(&map)?, format)?;
            }
        },
        Command::Metadata => match cli.format {
            OutputFormat::Text => {
                for (_, bundle) in &bundles {
                    for view in bundle.metadata() {
                        for (path, column) in &view.columns {
                            println!("{}\t{}\t{}", view.view, column, path);
                        }
                    }
                }
            }
            format => {
                let map: BTreeMap<&str, _> = bundles
                    .iter()
                    .map(|(name, bundle)| (name.as_str(), bundle.metadata()))
                    .collect();
                print_output(&serde_json::to_value(&map)?, format)?;
            }
        },
        Command::Classify { code, missing } => {
            let expected = classify(&code, !missing);
            match cli.format {
                OutputFormat::Text => {
                    println!("{}", if expected { "expected" } else { "unexpected" })
                }
                format => print_output(
                    &serde_json::json!({
                        "code": code,
                        "expecting": if missing { "missing" } else { "exists" },
                        "expected": expected,
                    }),
                    format,
                )?,
            }
        }
    }

    Ok(())
}

/// Compile every document type from every file matching `pattern`.
fn load(pattern: &str, document: Option<&str>) -> Result<Bundles, Box<dyn std::error::Error>> {
    let mut bundles: Bundles = Vec::new();
    let mut files = 0usize;
    for entry in glob::glob(pattern)? {
        let path = entry?;
        files += 1;
        log::debug!("reading definitions from {}", path.display());
        let definitions = parse_definitions(&path)?;
        let compiled = match document {
            Some(name) if definitions.documents.contains_key(name) => {
                vec![(name.to_string(), definitions.compile_document(name)?)]
            }
            Some(_) => Vec::new(),
            None => definitions.compile_all()?,
        };
        for (name, bundle) in compiled {
            if bundles.iter().any(|(existing, _)| *existing == name) {
                return Err(format!("Document type '{name}' is defined more than once").into());
            }
            bundles.push((name, bundle));
        }
    }

    if files == 0 {
        return Err(format!("No definition files match '{pattern}'").into());
    }
    if let Some(name) = document {
        if bundles.is_empty() {
            return Err(format!("Unknown document type '{name}'").into());
        }
    }
    Ok(bundles)
}

fn collect<F>(bundles: &Bundles, statements: F) -> Vec<(String, Vec<String>)>
where
    F: Fn(&SchemaBundle<StaticColumns>) -> Vec<String>,
{
    bundles
        .iter()
        .map(|(name, bundle)| (name.clone(), statements(bundle)))
        .collect()
}

/// Numeric codes are looked up in the vendor table first; every code is also
/// tried as a SQLSTATE, some of which are all digits.
fn classify(code: &str, expecting_existence: bool) -> bool {
    let code = code.trim();
    let numeric = code
        .parse::<i32>()
        .map(|numeric| docsql::vendor::is_expected_error(expecting_existence, numeric))
        .unwrap_or(false);
    numeric || docsql::vendor::is_expected_sqlstate(expecting_existence, code)
}

fn render_sql(statements: &[String]) -> String {
    statements.iter().map(|sql| format!("{sql};\n")).collect()
}

fn print_sql(statements: &[String]) {
    print!("{}", render_sql(statements));
}

fn print_statements(
    documents: &[(String, Vec<String>)],
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Text => {
            for (name, statements) in documents {
                if documents.len() > 1 {
                    println!("-- {name}");
                }
                print_sql(statements);
            }
            Ok(())
        }
        format => {
            let map: BTreeMap<&str, &Vec<String>> = documents
                .iter()
                .map(|(name, statements)| (name.as_str(), statements))
                .collect();
            print_output(&serde_json::to_value(&map)?, format)
        }
    }
}

fn print_output(
    value: &serde_json::Value,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml | OutputFormat::Text => print!("{}", serde_yaml::to_string(value)?),
    }
    Ok(())
}
