use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::time::Duration;

use ielts_client::cache::ResponseCache;
use ielts_client::preset::Preset;
use ielts_client::{api, app, config, logging, replay};

#[derive(Parser, Debug)]
#[command(name = "ielts-client")]
#[command(about = "Cached API access and touch gesture tooling for the IELTS practice client")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/ielts-client/config.yaml)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Interactive gesture pad: drag with the left mouse button, scroll with the wheel
  Pad {
    #[arg(long, value_enum, default_value_t)]
    preset: Preset,
  },
  /// Replay a YAML touch trace and print the gestures it fires
  Replay {
    trace: PathBuf,

    #[arg(long, value_enum, default_value_t)]
    preset: Preset,
  },
  /// Fetch an endpoint through the response cache
  Fetch {
    /// Endpoint path, e.g. /exercises
    endpoint: String,

    /// Query parameter as key=value; values are parsed as JSON when possible
    #[arg(short, long = "param", value_parser = parse_param)]
    params: Vec<(String, Value)>,

    /// Number of requests to make
    #[arg(long, default_value_t = 3)]
    repeat: u32,

    /// Delay between requests
    #[arg(long, default_value_t = 500)]
    interval_ms: u64,

    /// Warm the cache for another endpoint before the first request
    #[arg(long)]
    prefetch: Vec<String>,

    /// Drop the cached response before each request so every one goes to the network
    #[arg(long)]
    fresh: bool,
  },
  /// POST a JSON body and drop cached reads under the endpoint
  Submit {
    endpoint: String,

    /// JSON request body
    body: String,
  },
}

fn parse_param(raw: &str) -> Result<(String, Value), String> {
  let (name, value) = raw
    .split_once('=')
    .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
  let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
  Ok((name.to_string(), value))
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _log_guard = logging::init()?;

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;

  match args.command {
    Command::Pad { preset } => {
      let mut app = app::App::new(config, preset);
      app.run().await?;
    }
    Command::Replay { trace, preset } => {
      let trace = replay::Trace::load(&trace)?;
      for fired in replay::replay(&trace, preset, config.gestures) {
        println!("event {:>3}: {}", fired.index, fired.action);
      }
    }
    Command::Fetch {
      endpoint,
      params,
      repeat,
      interval_ms,
      prefetch,
      fresh,
    } => {
      let client = api::ApiClient::new(&config, ResponseCache::new())?;
      for other in &prefetch {
        client.prefetch(other, None);
      }
      let params: Map<String, Value> = params.into_iter().collect();
      let params = Some(&params).filter(|p| !p.is_empty());

      let key = client.cache_key(&endpoint, params);

      for attempt in 1..=repeat.max(1) {
        if fresh {
          client.cache().delete(&key);
        }
        let result = client
          .get(&endpoint, params)
          .await
          .map_err(|e| eyre!("Request {} failed: {}", attempt, e))?;

        println!(
          "#{} {:?}{} {}",
          attempt,
          result.source,
          result
            .cached_at
            .map(|at| format!(" (cached {})", at.format("%H:%M:%S")))
            .unwrap_or_default(),
          result.data
        );

        if attempt < repeat {
          tokio::time::sleep(Duration::from_millis(interval_ms)).await;
        }
      }

      for other in &prefetch {
        let warmed = client.cache().has(&client.cache_key(other, None));
        println!("prefetch {}: {}", other, if warmed { "cached" } else { "not cached" });
      }
    }
    Command::Submit { endpoint, body } => {
      let body: Value =
        serde_json::from_str(&body).map_err(|e| eyre!("Request body is not valid JSON: {}", e))?;
      let client = api::ApiClient::new(&config, ResponseCache::new())?;
      let response = client.post(&endpoint, &body).await?;
      println!("{}", response);
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_param() {
    assert_eq!(
      parse_param("page=2").unwrap(),
      ("page".to_string(), Value::from(2))
    );
    assert_eq!(
      parse_param("level=B2").unwrap(),
      ("level".to_string(), Value::String("B2".to_string()))
    );
    assert!(parse_param("nonsense").is_err());
  }

  #[test]
  fn test_cli_parses() {
    let args = Args::parse_from(["ielts-client", "fetch", "/goals", "-p", "page=1", "--repeat", "2"]);
    match args.command {
      Command::Fetch {
        endpoint,
        params,
        repeat,
        ..
      } => {
        assert_eq!(endpoint, "/goals");
        assert_eq!(params.len(), 1);
        assert_eq!(repeat, 2);
      }
      other => panic!("unexpected command {:?}", other),
    }
  }

  #[test]
  fn test_fetch_fresh_flag() {
    let args = Args::parse_from(["ielts-client", "fetch", "goals", "--fresh"]);
    match args.command {
      Command::Fetch { fresh, repeat, .. } => {
        assert!(fresh);
        assert_eq!(repeat, 3);
      }
      other => panic!("unexpected command {:?}", other),
    }
  }
}
