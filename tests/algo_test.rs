//! Algorithms over the seeded people network.
//!
//! Run with: `cargo test --test algo_test`

use casegraph::algo::{bfs, build_view, out_degree_centrality, page_rank, top_k, Orientation, PageRankConfig};
use casegraph::graph::{GraphStore, Label};
use casegraph::seed;

fn person(store: &GraphStore, given_name: &str) -> u64 {
    store
        .find_node(&Label::new("Person"), "givenName", given_name)
        .unwrap()
        .id
        .as_u64()
}

#[test]
fn test_reverse_pagerank_puts_the_head_of_the_clan_first() {
    let store = seed::people_graph().unwrap();
    let view = build_view(&store, Some("Person"), Some("DIRECTS"), Orientation::Reverse);

    let scores = page_rank(&view, &PageRankConfig::default());
    assert_eq!(scores.len(), 8);

    let ranked = top_k(scores, 2);
    assert_eq!(ranked[0].0, person(&store, "Amine"));
    assert_eq!(ranked[1].0, person(&store, "Hassan"));
    assert!(ranked[0].1 > ranked[1].1);
}

#[test]
fn test_direct_reports_by_out_degree() {
    let store = seed::people_graph().unwrap();
    let view = build_view(&store, Some("Person"), Some("DIRECTS"), Orientation::Natural);

    let ranked = top_k(out_degree_centrality(&view), 3);
    assert_eq!(ranked[0], (person(&store, "Amine"), 3.0));
    assert_eq!(ranked[1], (person(&store, "Hassan"), 2.0));
    assert_eq!(ranked.len(), 2);
}

#[test]
fn test_shortest_path_ignores_direction() {
    let store = seed::people_graph().unwrap();
    let directed = build_view(&store, None, None, Orientation::Natural);
    let undirected = build_view(&store, None, None, Orientation::Undirected);

    let said = person(&store, "Said");
    let karim = person(&store, "Karim");
    assert!(bfs(&directed, said, karim).is_none());

    let path = bfs(&undirected, said, karim).unwrap();
    assert_eq!(
        path.path,
        vec![said, person(&store, "Hassan"), person(&store, "Amine"), karim]
    );
    assert_eq!(path.cost, 3.0);
}
