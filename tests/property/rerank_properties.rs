use std::collections::HashSet;
use std::sync::Arc;

use edgequake_rerank::{
    MockRerankClient, NodePostprocessor, NodeWithScore, RerankConfig, RerankResponse,
    RerankResult, Reranker, TextNode,
};
use proptest::prelude::*;

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

fn make_nodes(texts: &[String]) -> Vec<NodeWithScore> {
    texts
        .iter()
        .enumerate()
        .map(|(i, t)| NodeWithScore::new(TextNode::new(format!("n{}", i), t.clone())))
        .collect()
}

proptest! {
    #[test]
    fn output_len_is_min_of_top_n_and_input(
        texts in prop::collection::vec("[a-z ]{0,20}", 0..12),
        top_n in 1usize..10,
        query in "[a-z ]{0,10}",
    ) {
        let client = MockRerankClient::new();
        let reranker = Reranker::new(
            Arc::new(client.clone()),
            RerankConfig::default().with_top_n(top_n),
        ).unwrap();

        let out = block_on(reranker.postprocess_nodes_with_query_str(make_nodes(&texts), &query))
            .unwrap();
        prop_assert_eq!(out.len(), top_n.min(texts.len()));

        let calls = block_on(client.call_count());
        prop_assert_eq!(calls, usize::from(!texts.is_empty()));
    }

    #[test]
    fn output_nodes_come_from_input(
        texts in prop::collection::vec("[a-z]{1,8}", 1..10),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 1..10),
        top_n in 1usize..10,
    ) {
        let nodes = make_nodes(&texts);
        let input: Vec<Arc<TextNode>> = nodes.iter().map(|n| Arc::clone(&n.node)).collect();

        // Distinct indices in arbitrary order, as an unordered service answer.
        let mut seen = HashSet::new();
        let results: Vec<RerankResult> = picks
            .iter()
            .map(|p| p.index(texts.len()))
            .filter(|i| seen.insert(*i))
            .enumerate()
            .map(|(rank, i)| RerankResult::new(i, 1.0 - rank as f64 * 0.01))
            .collect();
        let expected_len = results.len().min(top_n.min(texts.len()));

        let client = MockRerankClient::new();
        client.add_response_sync(RerankResponse::new(results.clone()));
        let reranker = Reranker::new(
            Arc::new(client),
            RerankConfig::default().with_top_n(top_n),
        ).unwrap();

        let out = block_on(reranker.postprocess_nodes_with_query_str(nodes, "q")).unwrap();
        prop_assert_eq!(out.len(), expected_len);
        for (node, result) in out.iter().zip(results.iter()) {
            prop_assert!(input.iter().any(|n| Arc::ptr_eq(n, &node.node)));
            prop_assert!(Arc::ptr_eq(&node.node, &input[result.index]));
            prop_assert_eq!(node.score, Some(result.relevance_score));
        }
    }

    #[test]
    fn configured_top_n_never_changes(
        n_nodes in 0usize..6,
        top_n in 1usize..8,
    ) {
        let texts: Vec<String> = (0..n_nodes).map(|i| format!("doc {}", i)).collect();
        let reranker = Reranker::new(
            Arc::new(MockRerankClient::new()),
            RerankConfig::default().with_top_n(top_n),
        ).unwrap();

        block_on(reranker.postprocess_nodes_with_query_str(make_nodes(&texts), "doc")).unwrap();
        prop_assert_eq!(reranker.top_n(), top_n);
    }
}
