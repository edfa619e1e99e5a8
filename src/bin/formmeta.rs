//! formmeta CLI
//!
//! Command-line interface for enriching API description documents with
//! presentation metadata.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use formmeta::{
    digest, load_document, load_document_auto, locate, Conditional, Enricher, GroupIndex,
    QueryParams, SchemaRole, StaticSource,
};

#[derive(Parser)]
#[command(name = "formmeta")]
#[command(about = "Enrich API description documents with form/grid metadata")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full enrichment pipeline for one path/operation
    Enrich {
        /// Document source: file path or URL (http:// or https://)
        document: String,

        /// API-internal path to enrich (e.g. /api/hr/employees/all)
        #[arg(long, short)]
        path: String,

        /// HTTP operation (e.g. get, post)
        #[arg(long, short)]
        op: String,

        /// Schema role: response (default) or request
        #[arg(long, default_value = "response")]
        role: String,

        /// Inline internal references into a flat shape
        #[arg(long)]
        include_internal: bool,

        /// Preferred identifier field name
        #[arg(long)]
        id_field: Option<String>,

        /// Mark the resource read-only
        #[arg(long)]
        read_only: bool,

        /// Tenant discriminator for the cache key
        #[arg(long)]
        tenant: Option<String>,

        /// Locale discriminator for the cache key
        #[arg(long)]
        locale: Option<String>,

        /// Prior validator; a match prints nothing and exits 0
        #[arg(long)]
        if_none_match: Option<String>,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Locate the schema behind a path/operation without enriching it
    Locate {
        /// Document source: file path or URL
        document: String,

        /// API-internal path
        #[arg(long, short)]
        path: String,

        /// HTTP operation
        #[arg(long, short)]
        op: String,

        /// Schema role: response (default) or request
        #[arg(long, default_value = "response")]
        role: String,
    },

    /// Print the canonical content digest of a JSON file
    Hash {
        /// JSON file to hash
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Enrich {
            document,
            path,
            op,
            role,
            include_internal,
            id_field,
            read_only,
            tenant,
            locale,
            if_none_match,
            output,
            pretty,
        } => run_enrich(EnrichArgs {
            document,
            path,
            op,
            role,
            include_internal,
            id_field,
            read_only,
            tenant,
            locale,
            if_none_match,
            output,
            pretty,
        }),

        Commands::Locate {
            document,
            path,
            op,
            role,
        } => run_locate(&document, &path, &op, &role),

        Commands::Hash { file } => run_hash(&file),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

struct EnrichArgs {
    document: String,
    path: String,
    op: String,
    role: String,
    include_internal: bool,
    id_field: Option<String>,
    read_only: bool,
    tenant: Option<String>,
    locale: Option<String>,
    if_none_match: Option<String>,
    output: Option<PathBuf>,
    pretty: bool,
}

fn run_enrich(args: EnrichArgs) -> Result<(), u8> {
    let role = SchemaRole::parse(&args.role).map_err(report)?;
    let document = load_document_auto(&args.document).map_err(report)?;

    // One explicit document, no group routing: an empty index always
    // resolves to the unscoped document.
    let enricher = Enricher::new(StaticSource::new(document), GroupIndex::default());

    let mut params = QueryParams::new(args.path, args.op)
        .role(role)
        .include_internal(args.include_internal);
    params.id_field_hint = args.id_field;
    params.read_only_hint = args.read_only.then_some(true);
    params.tenant = args.tenant;
    params.locale = args.locale;

    let outcome = enricher
        .query(params, args.if_none_match.as_deref())
        .map_err(report)?;

    match outcome {
        Conditional::NotModified { etag } => {
            eprintln!("not modified (etag {etag})");
            Ok(())
        }
        Conditional::Fresh { payload, etag } => {
            let json_output = if args.pretty {
                serde_json::to_string_pretty(&payload)
            } else {
                serde_json::to_string(&payload)
            }
            .map_err(|e| {
                eprintln!("Error serializing output: {e}");
                2u8
            })?;

            eprintln!("etag {etag}");
            match args.output {
                Some(path) => {
                    std::fs::write(&path, &json_output).map_err(|e| {
                        eprintln!("Error writing to {}: {e}", path.display());
                        3u8
                    })?;
                }
                None => println!("{json_output}"),
            }
            Ok(())
        }
    }
}

fn run_locate(document: &str, path: &str, op: &str, role: &str) -> Result<(), u8> {
    let role = SchemaRole::parse(role).map_err(report)?;
    let doc = load_document_auto(document).map_err(report)?;

    let located = locate(&doc, path, &op.to_ascii_lowercase(), role).map_err(report)?;

    match located.name {
        Some(name) => println!("{name}"),
        None => println!("(inline schema)"),
    }
    Ok(())
}

fn run_hash(file: &PathBuf) -> Result<(), u8> {
    let value = load_document(file).map_err(report)?;
    println!("{}", digest(&value));
    Ok(())
}

fn report(err: formmeta::EnrichError) -> u8 {
    eprintln!("Error: {err}");
    err.exit_code() as u8
}
