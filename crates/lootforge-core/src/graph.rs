use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::ids::RecordId;
use crate::records::SelectionList;

/// Summary of the nested-list graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListGraphSummary {
    pub nodes: usize,
    pub edges: usize,
}

/// Ordering report for nested selection lists.
///
/// `topo_order` lists inner lists before the lists that reference them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListGraphReport {
    pub summary: ListGraphSummary,
    pub topo_order: Option<Vec<RecordId>>,
    pub cycle: Option<Vec<RecordId>>,
}

/// Build a deterministic dependency report for nested selection lists.
pub fn build_list_graph_report<'a, I>(lists: I) -> ListGraphReport
where
    I: IntoIterator<Item = &'a SelectionList>,
{
    let graph = build_adjacency(lists);
    let nodes = graph.len();
    let edges = graph.values().map(|targets| targets.len()).sum();
    let summary = ListGraphSummary { nodes, edges };

    match toposort(&graph) {
        Ok(order) => ListGraphReport {
            summary,
            topo_order: Some(order),
            cycle: None,
        },
        Err(cycle) => ListGraphReport {
            summary,
            topo_order: None,
            cycle: Some(cycle),
        },
    }
}

/// Edges run from a nested list to every list that references it.
fn build_adjacency<'a, I>(lists: I) -> BTreeMap<RecordId, BTreeSet<RecordId>>
where
    I: IntoIterator<Item = &'a SelectionList>,
{
    let lists: Vec<&SelectionList> = lists.into_iter().collect();
    let known: BTreeSet<RecordId> = lists.iter().map(|list| list.id).collect();
    let mut graph: BTreeMap<RecordId, BTreeSet<RecordId>> = BTreeMap::new();

    for list in &lists {
        graph.entry(list.id).or_default();
        for entry in &list.entries {
            if known.contains(&entry.reference) {
                graph.entry(entry.reference).or_default().insert(list.id);
            }
        }
    }

    graph
}

fn toposort(
    graph: &BTreeMap<RecordId, BTreeSet<RecordId>>,
) -> Result<Vec<RecordId>, Vec<RecordId>> {
    let mut indegree: BTreeMap<RecordId, usize> = graph.keys().map(|node| (*node, 0)).collect();

    for targets in graph.values() {
        for target in targets {
            *indegree.entry(*target).or_insert(0) += 1;
        }
    }

    let mut ready: BTreeSet<RecordId> = indegree
        .iter()
        .filter_map(|(node, count)| if *count == 0 { Some(*node) } else { None })
        .collect();

    let mut order = Vec::with_capacity(graph.len());

    while let Some(node) = ready.pop_first() {
        order.push(node);

        if let Some(targets) = graph.get(&node) {
            for target in targets {
                if let Some(count) = indegree.get_mut(target) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        ready.insert(*target);
                    }
                }
            }
        }
    }

    if order.len() == graph.len() {
        Ok(order)
    } else {
        let cycle_nodes: Vec<RecordId> = indegree
            .into_iter()
            .filter_map(|(node, count)| if count > 0 { Some(node) } else { None })
            .collect();
        Err(cycle_nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Entry;

    fn list(id: u32, refs: &[u32]) -> SelectionList {
        SelectionList {
            id: RecordId(id),
            editor_id: None,
            flags: BTreeSet::new(),
            chance_none: 0,
            entries: refs
                .iter()
                .map(|reference| Entry {
                    reference: RecordId(*reference),
                    level: 1,
                    count: 1,
                })
                .collect(),
        }
    }

    #[test]
    fn nested_lists_come_first() {
        let lists = vec![list(1, &[2, 100]), list(2, &[3]), list(3, &[101])];
        let report = build_list_graph_report(&lists);
        assert_eq!(
            report.topo_order.expect("acyclic"),
            vec![RecordId(3), RecordId(2), RecordId(1)]
        );
        assert_eq!(report.summary.edges, 2);
    }

    #[test]
    fn reports_self_reference_as_cycle() {
        let lists = vec![list(1, &[1]), list(2, &[])];
        let report = build_list_graph_report(&lists);
        assert!(report.topo_order.is_none());
        assert_eq!(report.cycle.unwrap(), vec![RecordId(1)]);
    }
}
