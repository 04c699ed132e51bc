use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use qcloud_bucket_adapter::{
    domain::models::PutObjectOptions, AppBuilder, AppConfig, BucketAcl, CloudBucket, ListFilter,
    ObjectKey, QcloudBucket, QcloudClient, RequestBody, RequestContext,
};

#[derive(Parser, Debug)]
#[command(name = "qcloud-cos-cli")]
#[command(about = "CLI for Tencent Cloud COS buckets", long_about = None)]
struct Cli {
    #[arg(long, env = "QCLOUD_SECRET_ID", hide_env_values = true)]
    secret_id: String,

    #[arg(long, env = "QCLOUD_SECRET_KEY", hide_env_values = true)]
    secret_key: String,

    /// Account app id, appended to every bucket name on the wire
    #[arg(long, env = "QCLOUD_APP_ID")]
    app_id: String,

    #[arg(short, long, env = "QCLOUD_REGION", default_value = "ap-guangzhou")]
    region: String,

    /// Availability zone; its hosts replace the region's
    #[arg(long, env = "QCLOUD_ZONE")]
    zone: Option<String>,

    /// Log filter, e.g. `info` or `qcloud_bucket_adapter=debug`
    #[arg(long, env = "RUST_LOG", default_value = "warn")]
    log_level: String,

    /// Log every wire request; overrides `--log-level`
    #[arg(long, env = "QCLOUD_DEBUG")]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List buckets of the account
    Buckets,

    /// List objects
    Ls {
        bucket: String,
        #[arg(short, long)]
        prefix: Option<String>,
        #[arg(short, long)]
        delimiter: Option<String>,
        #[arg(long, default_value_t = 0)]
        max: usize,
    },

    /// Upload an object
    Put {
        bucket: String,
        key: String,
        /// File path to upload
        file: String,
        /// Canned ACL; defaults to the bucket's
        #[arg(long)]
        acl: Option<BucketAcl>,
        #[arg(long)]
        storage_class: Option<String>,
    },

    /// Download an object
    Get {
        bucket: String,
        key: String,
        /// Output file path; stdout when omitted
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Delete an object
    Rm { bucket: String, key: String },

    /// Print a presigned URL
    Url {
        bucket: String,
        key: String,
        #[arg(short, long, default_value = "GET")]
        method: String,
        /// Validity in seconds
        #[arg(short, long, default_value_t = 3600)]
        expire: u64,
    },

    /// Show or change the bucket ACL
    Acl {
        #[command(subcommand)]
        command: AclCommands,
    },

    /// Show or prune the bucket policy
    Policy {
        #[command(subcommand)]
        command: PolicyCommands,
    },

    /// Show bucket tags
    Tags { bucket: String },

    /// List in-flight multipart uploads
    Uploads { bucket: String },

    /// List CDN domains fronting the bucket
    Cdn { bucket: String },
}

#[derive(Subcommand, Debug)]
enum AclCommands {
    Get { bucket: String },
    Set { bucket: String, acl: BucketAcl },
}

#[derive(Subcommand, Debug)]
enum PolicyCommands {
    Get {
        bucket: String,
    },
    /// Remove statements by id
    Delete {
        bucket: String,
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn open_bucket(
    client: &Arc<QcloudClient>,
    zone: Option<&str>,
    name: &str,
) -> Result<QcloudBucket> {
    client
        .zoned_bucket(name, None, None, zone)
        .with_context(|| format!("invalid bucket name {}", name))
}

fn object_key(key: &str) -> Result<ObjectKey> {
    ObjectKey::new(key).with_context(|| format!("invalid object key {}", key))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("qcloud_bucket_adapter=debug,info")
    } else {
        EnvFilter::new(&cli.log_level)
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = AppConfig::new(cli.secret_id, cli.secret_key, cli.app_id);
    config.region = cli.region;
    let client = AppBuilder::new().with_config(config).build()?;
    info!(app_id = %client.app_id(), region = %client.config().region, "Client configured");
    let ctx = RequestContext::new();
    let zone = cli.zone.as_deref();

    match cli.command {
        Commands::Buckets => {
            print_json(&client.list_buckets(&ctx).await?)?;
        }
        Commands::Ls {
            bucket,
            prefix,
            delimiter,
            max,
        } => {
            let bucket = open_bucket(&client, zone, &bucket)?;
            let mut filter = ListFilter::new().with_max_count(max);
            filter.prefix = prefix;
            filter.delimiter = delimiter;
            print_json(&bucket.list_objects(&ctx, &filter).await?)?;
        }
        Commands::Put {
            bucket,
            key,
            file,
            acl,
            storage_class,
        } => {
            let bucket = open_bucket(&client, zone, &bucket)?;
            let data = tokio::fs::read(&file)
                .await
                .with_context(|| format!("reading {}", file))?;
            let size = data.len() as i64;
            let options = PutObjectOptions {
                acl,
                storage_class,
                ..Default::default()
            };
            bucket
                .put_object(&ctx, &object_key(&key)?, RequestBody::from(data), size, options)
                .await?;
            println!("uploaded {} ({} bytes)", key, size);
        }
        Commands::Get {
            bucket,
            key,
            output,
        } => {
            let bucket = open_bucket(&client, zone, &bucket)?;
            let body = bucket.get_object(&ctx, &object_key(&key)?, None).await?;
            let mut reader = body.into_async_read();
            match output {
                Some(path) => {
                    let mut file = tokio::fs::File::create(&path)
                        .await
                        .with_context(|| format!("creating {}", path))?;
                    tokio::io::copy(&mut reader, &mut file).await?;
                }
                None => {
                    tokio::io::copy(&mut reader, &mut tokio::io::stdout()).await?;
                }
            }
        }
        Commands::Rm { bucket, key } => {
            let bucket = open_bucket(&client, zone, &bucket)?;
            bucket.delete_object(&ctx, &object_key(&key)?).await?;
        }
        Commands::Url {
            bucket,
            key,
            method,
            expire,
        } => {
            let bucket = open_bucket(&client, zone, &bucket)?;
            let url =
                bucket.get_temp_url(&method, &object_key(&key)?, Duration::from_secs(expire))?;
            println!("{}", url);
        }
        Commands::Acl { command } => match command {
            AclCommands::Get { bucket } => {
                let bucket = open_bucket(&client, zone, &bucket)?;
                println!("{}", bucket.get_acl(&ctx).await?);
            }
            AclCommands::Set { bucket, acl } => {
                let bucket = open_bucket(&client, zone, &bucket)?;
                bucket.set_acl(&ctx, acl).await?;
            }
        },
        Commands::Policy { command } => match command {
            PolicyCommands::Get { bucket } => {
                let bucket = open_bucket(&client, zone, &bucket)?;
                print_json(&bucket.get_policy().await?)?;
            }
            PolicyCommands::Delete { bucket, ids } => {
                let bucket = open_bucket(&client, zone, &bucket)?;
                print_json(&bucket.delete_policy(&ids).await?)?;
            }
        },
        Commands::Tags { bucket } => {
            let bucket = open_bucket(&client, zone, &bucket)?;
            print_json(&bucket.get_tags().await?)?;
        }
        Commands::Uploads { bucket } => {
            let bucket = open_bucket(&client, zone, &bucket)?;
            print_json(&bucket.list_multipart_uploads(&ctx).await?)?;
        }
        Commands::Cdn { bucket } => {
            let bucket = open_bucket(&client, zone, &bucket)?;
            print_json(&bucket.get_cdn_domains().await?)?;
        }
    }

    Ok(())
}
