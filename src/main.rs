// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{bail, Context, Result};
use std::env;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use the_flowgraph::config::{
    link, link_for_node, load_flow, load_settings, parse_settings, BuildContext, LauncherSettings,
    ProcessorRegistry,
};
use the_flowgraph::context::EnvContext;
use the_flowgraph::engine::LauncherFactory;
use the_flowgraph::errors::ConfigError;
use the_flowgraph::events::{ChannelObserver, TracingObserver};
use the_flowgraph::observability::init_tracing;
use the_flowgraph::storage::LocalStorage;

const USAGE: &str = "Usage: flowgraph <flow.json> [--node NAME] [--settings FILE]";

struct Args {
    flow: String,
    node: Option<String>,
    settings: Option<String>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mut flow = None;
    let mut node = None;
    let mut settings = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--node" => node = Some(args.next().context("--node needs a value")?),
            "--settings" => settings = Some(args.next().context("--settings needs a value")?),
            "-h" | "--help" => bail!(USAGE),
            other if flow.is_none() && !other.starts_with("--") => flow = Some(other.to_string()),
            other => bail!("unexpected argument '{}'\n{}", other, USAGE),
        }
    }

    Ok(Args {
        flow: flow.context(USAGE)?,
        node,
        settings,
    })
}

fn settings(path: Option<&str>) -> Result<LauncherSettings, ConfigError> {
    match path {
        Some(path) => load_settings(path),
        None => parse_settings("", |name| env::var(name).ok()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only events and results.
    init_tracing();
    let args = parse_args(env::args().skip(1))?;

    let settings = settings(args.settings.as_deref())?;
    let flow = load_flow(&args.flow)?;

    let mut storage = LocalStorage::new(&settings.storage.local_dir);
    if let Some(base_url) = &settings.storage.base_url {
        storage = storage.with_base_url(base_url.as_str());
    }
    let ctx = BuildContext::from_settings(&settings.background_tasks)
        .with_storage(Arc::new(storage));
    let tasks = Arc::clone(&ctx.tasks);
    let registry = ProcessorRegistry::with_builtins();

    let graph = match &args.node {
        Some(target) => link_for_node(&flow, target, &registry, &ctx),
        None => link(&flow, &registry, &ctx),
    }
    .map_err(ConfigError::from)?
    .with_context(Arc::new(EnvContext::from_env(EnvContext::DEFAULT_PREFIX)));

    let (observer, mut events) = ChannelObserver::channel();
    graph.add_observer(Arc::new(observer));
    graph.add_observer(Arc::new(TracingObserver));
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            println!("{}", event);
        }
    });

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let launcher = LauncherFactory::from_settings(&settings);
    let result = match &args.node {
        Some(target) => launcher.launch_single(&graph, target, cancel).await,
        None => launcher.launch(&graph, cancel).await,
    };

    let outputs: Vec<(String, serde_json::Value)> = graph
        .nodes()
        .filter_map(|n| n.output().ok().map(|o| (n.name().to_string(), o.to_value())))
        .collect();

    // The observer holds the only sender; dropping the graph ends the printer.
    drop(graph);
    printer.await.context("event printer stopped unexpectedly")?;
    tasks.shutdown();

    let summary = result?;
    eprintln!(
        "Completed {} node(s), reused {} cached, in {:.2?}",
        summary.completed.len(),
        summary.skipped_cached.len(),
        summary.duration
    );
    for (name, output) in outputs {
        println!("{} = {}", name, output);
    }
    Ok(())
}
