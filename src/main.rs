use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use comm_eval::community::Community;
use comm_eval::compare;
use comm_eval::config::ExperimentConfig;
use comm_eval::graph::WeightedGraph;
use comm_eval::loader;
use comm_eval::logger::init_logger;
use comm_eval::report;

/// Vertex identifier used by the command line front end. The library itself
/// is generic over the id type.
type VId = u32;

#[derive(Parser)]
#[command(
    name = "comm_eval",
    about = "Score community partitions against graphs and ground truth."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print summary statistics for a graph file.
    Info {
        /// Path to the graph file.
        #[arg(long)]
        graph: PathBuf,
        /// Treat the file as the dense format instead of an edge list.
        #[arg(long)]
        dense: bool,
    },
    /// Score a community assignment against a graph.
    Score {
        #[arg(long)]
        graph: PathBuf,
        /// Path to the `<nodeId> <communityId>` assignment file.
        #[arg(long)]
        communities: PathBuf,
        #[arg(long)]
        dense: bool,
    },
    /// Compare a predicted assignment against ground truth.
    Compare {
        /// Ground-truth assignment file.
        #[arg(long)]
        truth: PathBuf,
        /// Predicted assignment file.
        #[arg(long)]
        pred: PathBuf,
    },
    /// Run an experiment described by a YAML config.
    Bench {
        #[arg(long)]
        config: PathBuf,
    },
}

fn load_graph(path: &Path, dense: bool) -> Result<WeightedGraph<VId>> {
    let graph = if dense {
        loader::load_dense_graph(path)
    } else {
        loader::load_edge_list(path)
    };
    graph.with_context(|| format!("loading graph from {}", path.display()))
}

fn run_info(graph_path: &Path, dense: bool) -> Result<()> {
    let graph = load_graph(graph_path, dense)?;
    println!("Vertices: {}", graph.get_vertex_count());
    println!("Edges: {}", graph.get_edge_count());
    println!("Total weight: {}", graph.get_total_weight());
    Ok(())
}

fn run_score(graph_path: &Path, communities_path: &Path, dense: bool) -> Result<()> {
    let graph = Arc::new(load_graph(graph_path, dense)?);
    let mut communities: Vec<Community<VId>> = loader::load_communities(communities_path)
        .with_context(|| format!("loading communities from {}", communities_path.display()))?;

    for community in &mut communities {
        community.calculate_weights(&graph);
    }

    report::print_community_statistics(&communities);
    for (label, community) in communities.iter().enumerate() {
        println!(
            "Community {}: internal weight {:.4}, external weight {:.4}",
            label,
            community.get_internal_weight(),
            community.get_external_weight()
        );
    }
    Ok(())
}

fn run_compare(truth_path: &Path, pred_path: &Path) -> Result<()> {
    let truth: Vec<Community<VId>> = loader::load_communities(truth_path)
        .with_context(|| format!("loading ground truth from {}", truth_path.display()))?;
    let mut predicted: Vec<Community<VId>> = loader::load_communities(pred_path)
        .with_context(|| format!("loading prediction from {}", pred_path.display()))?;

    // Truth vertices the prediction never assigned land in one catch-all
    // community before alignment.
    let truth_nodes = compare::node_set(&truth);
    let pred_nodes = compare::node_set(&predicted);
    compare::handle_missing_nodes(&mut predicted, &truth_nodes, &pred_nodes);

    report::compare_community_assignments(&truth, &predicted);
    Ok(())
}

fn run_bench(config_path: &Path) -> Result<()> {
    let config = ExperimentConfig::from_yaml_file(config_path)
        .with_context(|| format!("loading experiment config from {}", config_path.display()))?;
    info!("running experiment from {}", config_path.display());

    run_compare(Path::new(&config.truth_file), Path::new(&config.pred_file))?;

    if let Some(graph_file) = &config.graph_file {
        println!();
        run_score(Path::new(graph_file), Path::new(&config.pred_file), false)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    if let Err(err) = init_logger() {
        eprintln!("logger init failed: {}", err);
    }

    let cli = Cli::parse();
    match cli.command {
        Command::Info { graph, dense } => run_info(&graph, dense),
        Command::Score {
            graph,
            communities,
            dense,
        } => run_score(&graph, &communities, dense),
        Command::Compare { truth, pred } => run_compare(&truth, &pred),
        Command::Bench { config } => run_bench(&config),
    }
}
