//! Command-line front end: evaluate a request against policy documents, validate documents, or list the S3
//! action catalog.

use {
    anyhow::{bail, Context, Result},
    clap::{ArgAction, Args, Parser, Subcommand},
    log::{debug, info},
    s3_policy_eval::{s3, AccessRequest, Policy, PolicySet, PolicySource},
    scratchstack_arn::Arn,
    std::{
        fs,
        path::{Path, PathBuf},
        process::ExitCode,
        str::FromStr,
    },
};

/// Evaluate S3 access requests against bucket and identity policies.
#[derive(Parser, Debug)]
#[command(name = "s3-policy-eval", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decide whether a principal may perform an action on a resource.
    Evaluate(EvaluateArgs),

    /// Load policy documents and report any errors.
    Validate(ValidateArgs),

    /// List the known S3 actions and the resource level each applies to.
    Actions,
}

/// Exit status when the request is allowed or every document loaded.
const STATUS_OK: u8 = 0;

/// Exit status when a document failed to load or validate.
const STATUS_INVALID: u8 = 1;

/// Exit status when the request is denied, explicitly or by default.
const STATUS_DENIED: u8 = 2;

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// The requesting principal: an IAM ARN, a service principal, or a bare IAM name.
    #[arg(long)]
    principal: String,

    /// The policy action being requested, e.g. s3:GetObject.
    #[arg(long, required_unless_present = "operation", conflicts_with = "operation")]
    action: Option<String>,

    /// The S3 API operation being called, e.g. ListObjectsV2. Mapped onto its policy action.
    #[arg(long)]
    operation: Option<String>,

    /// The ARN of the bucket or object being accessed.
    #[arg(long)]
    resource: String,

    /// The bucket policy of the bucket named in the resource ARN.
    #[arg(long)]
    bucket_policy: Option<PathBuf>,

    /// An identity policy, given as PRINCIPAL=FILE. May be repeated.
    #[arg(long, value_parser = parse_identity_policy)]
    identity_policy: Vec<(String, PathBuf)>,

    /// Print the evaluation as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Also check each document as the bucket policy of this bucket.
    #[arg(long)]
    bucket: Option<String>,

    /// Policy documents to load.
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn parse_identity_policy(s: &str) -> Result<(String, PathBuf), String> {
    match s.split_once('=') {
        Some((principal, file)) if !principal.is_empty() && !file.is_empty() => {
            Ok((principal.to_string(), PathBuf::from(file)))
        }
        _ => Err(format!("expected PRINCIPAL=FILE, got {:?}", s)),
    }
}

/// The bucket named by an S3 bucket or object ARN.
fn bucket_of(resource: &Arn) -> &str {
    let name = resource.resource();
    match name.split_once('/') {
        Some((bucket, _)) => bucket,
        None => name,
    }
}

/// A policy name derived from a file name: `policies/read-only.json` becomes `read-only`.
fn policy_name(path: &Path) -> String {
    path.file_stem().map(|stem| stem.to_string_lossy().into_owned()).unwrap_or_else(|| path.display().to_string())
}

fn load_policy(path: &Path) -> Result<Policy> {
    let text = fs::read_to_string(path).with_context(|| format!("Unable to read {}", path.display()))?;
    let policy = Policy::from_str(&text).with_context(|| format!("Unable to load policy {}", path.display()))?;
    debug!("Loaded {} with {} statement(s)", path.display(), policy.statement().len());
    Ok(policy)
}

fn run_evaluate(args: &EvaluateArgs) -> Result<u8> {
    let action = match (&args.action, &args.operation) {
        (Some(action), _) => action.clone(),
        (None, Some(operation)) => format!("{}:{}", s3::SERVICE, s3::action_for_operation(operation)),
        (None, None) => bail!("Either --action or --operation must be given"),
    };

    let request = AccessRequest::new(&args.principal, &action, &args.resource)?;
    info!("Evaluating {}", request);

    if args.bucket_policy.is_none() && args.identity_policy.is_empty() {
        bail!("At least one of --bucket-policy or --identity-policy must be given");
    }

    let mut policies = PolicySet::new();

    if let Some(path) = &args.bucket_policy {
        let source = PolicySource::Bucket {
            bucket: bucket_of(request.resource()).to_string(),
            policy_name: Some(policy_name(path)),
        };
        policies.insert(source, load_policy(path)?).with_context(|| format!("Rejected {}", path.display()))?;
    }

    for (principal, path) in &args.identity_policy {
        let source = PolicySource::Identity {
            principal: principal.clone(),
            policy_name: policy_name(path),
        };
        policies.insert(source, load_policy(path)?).with_context(|| format!("Rejected {}", path.display()))?;
    }

    let evaluation = policies.evaluate(&request);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&evaluation)?);
    } else {
        println!("{}", evaluation);
    }

    Ok(if evaluation.is_allowed() {
        STATUS_OK
    } else {
        STATUS_DENIED
    })
}

fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let mut failures = 0;

    for path in &args.files {
        let result = load_policy(path).and_then(|policy| {
            if let Some(bucket) = &args.bucket {
                let source = PolicySource::Bucket {
                    bucket: bucket.clone(),
                    policy_name: Some(policy_name(path)),
                };
                PolicySet::new().insert(source, policy.clone())?;
            }
            Ok(policy)
        });

        match result {
            Ok(policy) => println!("{}: ok ({} statement(s))", path.display(), policy.statement().len()),
            Err(e) => {
                failures += 1;
                println!("{}: {:#}", path.display(), e);
            }
        }
    }

    Ok(if failures == 0 {
        STATUS_OK
    } else {
        STATUS_INVALID
    })
}

fn run_actions() -> Result<u8> {
    for (action, level) in s3::actions() {
        println!("{}:{:<48} {}", s3::SERVICE, action, level);
    }
    Ok(STATUS_OK)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let status = match &cli.command {
        Commands::Evaluate(args) => run_evaluate(args)?,
        Commands::Validate(args) => run_validate(args)?,
        Commands::Actions => run_actions()?,
    };

    Ok(ExitCode::from(status))
}
