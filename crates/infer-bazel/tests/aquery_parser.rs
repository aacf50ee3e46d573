use infer_bazel::{
    proto::{v1, v2},
    ActionGraph, OUTPUT_FLAG,
};
use prost::Message;
use std::collections::BTreeSet;

fn strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn set(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn fragment(id: u32, parent_id: u32, label: &str) -> v2::PathFragment {
    v2::PathFragment {
        id,
        label: label.to_string(),
        parent_id,
    }
}

fn v2_action(mnemonic: &str, arguments: &[&str], output_ids: &[u32]) -> v2::Action {
    v2::Action {
        action_key: format!("{mnemonic}-{}", output_ids.len()),
        mnemonic: mnemonic.to_string(),
        arguments: strings(arguments),
        output_ids: output_ids.to_vec(),
    }
}

fn v1_action(mnemonic: &str, arguments: &[&str], output_ids: &[&str]) -> v1::Action {
    v1::Action {
        action_key: format!("{mnemonic}-{}", output_ids.len()),
        mnemonic: mnemonic.to_string(),
        arguments: strings(arguments),
        output_ids: strings(output_ids),
    }
}

const COMPILE_APP: &[&str] = &[
    "external/remotejdk/bin/java",
    "--classpath",
    "bazel-out/bin/liba.jar",
    "bazel-out/bin/libb.jar",
    "--output",
    "bazel-out/bin/app.jar",
    "--sources",
    "src/App.java",
];
const COMPILE_LIBB: &[&str] = &["--output", "bazel-out/bin/libb.jar"];

/// Two `Javac` actions: `app.jar` depends on `liba.jar` and on `libb.jar`,
/// and `libb.jar` is itself compiled in the same graph.
fn v2_graph() -> v2::ActionGraphContainer {
    v2::ActionGraphContainer {
        path_fragments: vec![
            fragment(1, 0, "bazel-out"),
            fragment(2, 1, "bin"),
            fragment(3, 2, "liba.jar"),
            fragment(4, 2, "libb.jar"),
            fragment(5, 2, "app.jar"),
        ],
        artifacts: vec![
            v2::Artifact {
                id: 1,
                path_fragment_id: 3,
                is_tree_artifact: false,
            },
            v2::Artifact {
                id: 2,
                path_fragment_id: 4,
                is_tree_artifact: false,
            },
            v2::Artifact {
                id: 3,
                path_fragment_id: 5,
                is_tree_artifact: false,
            },
            // Points at a fragment the response never sent.
            v2::Artifact {
                id: 4,
                path_fragment_id: 42,
                is_tree_artifact: false,
            },
        ],
        actions: vec![
            v2_action("Javac", COMPILE_APP, &[3]),
            v2_action("Javac", COMPILE_LIBB, &[2]),
            v2_action("JavaSourceJar", &["--classpath", "bazel-out/bin/app.jar"], &[]),
        ],
    }
}

fn v1_graph() -> v1::ActionGraphContainer {
    let artifact = |id: &str, exec_path: &str| v1::Artifact {
        id: id.to_string(),
        exec_path: exec_path.to_string(),
        is_tree_artifact: false,
    };
    v1::ActionGraphContainer {
        artifacts: vec![
            artifact("1", "bazel-out/bin/liba.jar"),
            artifact("2", "bazel-out/bin/libb.jar"),
            artifact("3", "bazel-out/bin/app.jar"),
        ],
        actions: vec![
            v1_action("Javac", COMPILE_APP, &["3"]),
            v1_action("Javac", COMPILE_LIBB, &["2"]),
            v1_action("JavaSourceJar", &["--classpath", "bazel-out/bin/app.jar"], &[]),
        ],
    }
}

#[test]
fn v2_response_is_decoded_as_v2() {
    let graph = ActionGraph::decode(&v2_graph().encode_to_vec()).unwrap();
    assert!(matches!(graph, ActionGraph::V2(_)));
}

#[test]
fn v1_response_falls_back_to_v1() {
    let graph = ActionGraph::decode(&v1_graph().encode_to_vec()).unwrap();
    assert!(matches!(graph, ActionGraph::V1(_)));
}

#[test]
fn classpath_excludes_jars_built_by_matching_actions() {
    for bytes in [v2_graph().encode_to_vec(), v1_graph().encode_to_vec()] {
        let graph = ActionGraph::decode(&bytes).unwrap();
        assert_eq!(
            graph.select_paths("Javac", "--classpath"),
            set(&["bazel-out/bin/liba.jar"])
        );
    }
}

#[test]
fn output_flag_selects_the_outputs_themselves() {
    for bytes in [v2_graph().encode_to_vec(), v1_graph().encode_to_vec()] {
        let graph = ActionGraph::decode(&bytes).unwrap();
        assert_eq!(
            graph.select_paths("Javac", OUTPUT_FLAG),
            set(&["bazel-out/bin/app.jar", "bazel-out/bin/libb.jar"])
        );
    }
}

#[test]
fn only_actions_with_the_requested_mnemonic_are_scanned() {
    let graph = ActionGraph::decode(&v2_graph().encode_to_vec()).unwrap();
    // `app.jar` is only passed to `--classpath` of the JavaSourceJar action, and
    // the Javac action that outputs it is not consulted for this mnemonic.
    assert_eq!(
        graph.select_paths("JavaSourceJar", "--classpath"),
        set(&["bazel-out/bin/app.jar"])
    );
    assert!(graph.select_paths("Turbine", "--classpath").is_empty());
}

#[test]
fn arguments_without_a_known_artifact_are_ignored() {
    let graph = ActionGraph::decode(&v2_graph().encode_to_vec()).unwrap();
    // `src/App.java` is a `--sources` argument but no artifact carries that path.
    assert!(graph.select_paths("Javac", "--sources").is_empty());
}

#[test]
fn undecodable_response_is_an_error() {
    assert!(ActionGraph::decode(b"\x0a\xff\xff\xff\xff\xff\xff").is_err());
}
