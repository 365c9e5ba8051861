//! Line-oriented file collaborators for the graph core.
//!
//! Three text formats are supported: a plain edge list, the dense graph
//! format with declared counts, and the `<nodeId> <communityId>` community
//! assignment format. Malformed lines are skipped with a diagnostic; a
//! mismatch between a declared and an actual count aborts the load.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use log::{info, warn};

use crate::community::Community;
use crate::config::READ_BUFFER_SIZE;
use crate::error::{CommEvalError, Result};
use crate::graph::WeightedGraph;
use crate::types::{VertexId, Weight};

fn parse_edge_tokens<V>(tokens: &[&str]) -> Option<(V, V, Weight)>
where
    V: VertexId + FromStr,
{
    if tokens.len() != 3 {
        return None;
    }
    let from = tokens[0].parse::<V>().ok()?;
    let to = tokens[1].parse::<V>().ok()?;
    let weight = tokens[2].parse::<Weight>().ok()?;
    Some((from, to, weight))
}

/// Load a graph from an edge list, one `<from> <to> <weight>` per line.
///
/// Lines that do not parse, and edges the graph rejects, are skipped with a
/// warning. Blank lines are ignored silently.
pub fn load_edge_list<V>(path: impl AsRef<Path>) -> Result<WeightedGraph<V>>
where
    V: VertexId + FromStr,
{
    let file = File::open(path.as_ref())?;
    let reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
    let mut graph = WeightedGraph::new();
    let mut skipped = 0usize;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        match parse_edge_tokens::<V>(&tokens) {
            None => {
                warn!("skipping malformed edge line {}: {:?}", line_no + 1, line);
                skipped += 1;
            }
            Some((from, to, weight)) => {
                if let Err(err) = graph.add_edge(from, to, weight) {
                    warn!("skipping edge line {}: {}", line_no + 1, err);
                    skipped += 1;
                }
            }
        }
    }

    info!(
        "loaded edge list: {} vertices, {} edges, {} lines skipped",
        graph.get_vertex_count(),
        graph.get_edge_count(),
        skipped
    );
    Ok(graph)
}

/// Load a graph from the dense format:
/// line 1 vertex count, line 2 the vertex list, line 3 edge count, then that
/// many `<from> <to> <weight>` lines.
///
/// Structural problems abort the load: a declared count that disagrees with
/// the content, an edge naming an undeclared vertex, or a duplicate edge.
pub fn load_dense_graph<V>(path: impl AsRef<Path>) -> Result<WeightedGraph<V>>
where
    V: VertexId + FromStr,
{
    let file = File::open(path.as_ref())?;
    let reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
    let mut lines = reader.lines();

    let mut next_line = || -> Result<String> {
        match lines.next() {
            None => Err(CommEvalError::MalformedInput {
                detail: "unexpected end of dense graph file".to_string(),
            }),
            Some(line) => Ok(line?),
        }
    };

    // Step 1. Declared vertex count.
    let declared_vertices: usize =
        next_line()?
            .trim()
            .parse()
            .map_err(|_| CommEvalError::MalformedInput {
                detail: "dense graph file must start with a vertex count".to_string(),
            })?;

    // Step 2. The vertex list itself. Duplicates here are structural errors.
    let mut graph = WeightedGraph::new();
    let vertex_line = next_line()?;
    for token in vertex_line.split_whitespace() {
        let vertex = token
            .parse::<V>()
            .map_err(|_| CommEvalError::MalformedInput {
                detail: format!("unparsable vertex {:?} in dense graph file", token),
            })?;
        graph.add_vertex(vertex)?;
    }
    if graph.get_vertex_count() != declared_vertices {
        return Err(CommEvalError::CountMismatch {
            what: "vertex".to_string(),
            declared: declared_vertices,
            found: graph.get_vertex_count(),
        });
    }

    // Step 3. Declared edge count, then the edges.
    let declared_edges: usize =
        next_line()?
            .trim()
            .parse()
            .map_err(|_| CommEvalError::MalformedInput {
                detail: "dense graph file edge count is unparsable".to_string(),
            })?;

    let mut found_edges = 0usize;
    for (offset, line) in lines.enumerate() {
        let line = line?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        match parse_edge_tokens::<V>(&tokens) {
            None => {
                warn!("skipping malformed dense edge line {}: {:?}", offset + 4, line);
            }
            Some((from, to, weight)) => {
                // Dense files declare their vertices up front; an edge may
                // not invent new ones.
                for endpoint in [&from, &to] {
                    if !graph.has_vertex(endpoint) {
                        return Err(CommEvalError::VertexNotFound {
                            vertex: endpoint.to_string(),
                        });
                    }
                }
                graph.add_edge(from, to, weight)?;
                found_edges += 1;
            }
        }
    }
    if found_edges != declared_edges {
        return Err(CommEvalError::CountMismatch {
            what: "edge".to_string(),
            declared: declared_edges,
            found: found_edges,
        });
    }

    info!(
        "loaded dense graph: {} vertices, {} edges",
        graph.get_vertex_count(),
        graph.get_edge_count()
    );
    Ok(graph)
}

/// Write a graph in the dense format, edges in canonical order so the output
/// is reproducible.
pub fn save_dense_graph<V: VertexId>(graph: &WeightedGraph<V>, path: impl AsRef<Path>) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{}", graph.get_vertex_count())?;
    let vertex_line = graph
        .get_vertices()
        .iter()
        .map(|vertex| vertex.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(writer, "{}", vertex_line)?;

    writeln!(writer, "{}", graph.get_edge_count())?;
    for (from, to, weight) in graph.edges_ordered() {
        writeln!(writer, "{} {} {}", from, to, weight)?;
    }
    writer.flush()?;
    Ok(())
}

/// Load a community assignment, one `<nodeId> <communityId>` per line.
///
/// Rows are grouped by community id and the groups are returned in ascending
/// id order, so label indices come out deterministic. Malformed lines are
/// skipped with a diagnostic.
pub fn load_communities<V>(path: impl AsRef<Path>) -> Result<Vec<Community<V>>>
where
    V: VertexId + FromStr,
{
    let file = File::open(path.as_ref())?;
    let reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
    let mut community_map = BTreeMap::<i64, Community<V>>::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        let parsed = if tokens.len() == 2 {
            tokens[0]
                .parse::<V>()
                .ok()
                .zip(tokens[1].parse::<i64>().ok())
        } else {
            None
        };
        match parsed {
            None => {
                warn!(
                    "skipping malformed assignment line {}: {:?}",
                    line_no + 1,
                    line
                );
            }
            Some((node, community_id)) => {
                community_map
                    .entry(community_id)
                    .or_insert_with(Community::new)
                    .add_node(node);
            }
        }
    }

    info!("loaded {} communities", community_map.len());
    Ok(community_map.into_values().collect())
}
