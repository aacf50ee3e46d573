//! The subset of Bazel's `analysis.proto` / `analysis_v2.proto` messages that
//! classpath discovery reads. Fields not listed here are skipped by the decoder.

/// `com.google.devtools.build.lib.analysis.AnalysisProtos` (string ids, literal exec paths).
pub mod v1 {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ActionGraphContainer {
        #[prost(message, repeated, tag = "1")]
        pub artifacts: Vec<Artifact>,
        #[prost(message, repeated, tag = "2")]
        pub actions: Vec<Action>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Artifact {
        #[prost(string, tag = "1")]
        pub id: String,
        #[prost(string, tag = "2")]
        pub exec_path: String,
        #[prost(bool, tag = "3")]
        pub is_tree_artifact: bool,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Action {
        #[prost(string, tag = "3")]
        pub action_key: String,
        #[prost(string, tag = "4")]
        pub mnemonic: String,
        #[prost(string, repeated, tag = "6")]
        pub arguments: Vec<String>,
        #[prost(string, repeated, tag = "9")]
        pub output_ids: Vec<String>,
    }
}

/// `com.google.devtools.build.lib.analysis.AnalysisProtosV2` (numeric ids, path fragments).
pub mod v2 {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ActionGraphContainer {
        #[prost(message, repeated, tag = "1")]
        pub artifacts: Vec<Artifact>,
        #[prost(message, repeated, tag = "2")]
        pub actions: Vec<Action>,
        #[prost(message, repeated, tag = "8")]
        pub path_fragments: Vec<PathFragment>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Artifact {
        #[prost(uint32, tag = "1")]
        pub id: u32,
        #[prost(uint32, tag = "2")]
        pub path_fragment_id: u32,
        #[prost(bool, tag = "3")]
        pub is_tree_artifact: bool,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Action {
        #[prost(string, tag = "3")]
        pub action_key: String,
        #[prost(string, tag = "4")]
        pub mnemonic: String,
        #[prost(string, repeated, tag = "6")]
        pub arguments: Vec<String>,
        #[prost(uint32, repeated, tag = "9")]
        pub output_ids: Vec<u32>,
    }

    /// One label of a deduplicated path; the root fragment has `parent_id == 0`.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct PathFragment {
        #[prost(uint32, tag = "1")]
        pub id: u32,
        #[prost(string, tag = "2")]
        pub label: String,
        #[prost(uint32, tag = "3")]
        pub parent_id: u32,
    }
}
