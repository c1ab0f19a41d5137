//! CLI argument definitions for the Neo4j backend.

use clap::Args;

/// Neo4j connection arguments.
#[derive(Args, Clone, Debug)]
pub struct Neo4jArgs {
    /// Neo4j connection URI (e.g., bolt://localhost:7687)
    #[arg(long, env = "NEO4J_URI", default_value = "bolt://localhost:7687")]
    pub neo4j_uri: String,

    /// Neo4j username
    #[arg(long, env = "NEO4J_USERNAME", default_value = "neo4j")]
    pub neo4j_username: String,

    /// Neo4j password
    #[arg(long, env = "NEO4J_PASSWORD", default_value = "neo4j")]
    pub neo4j_password: String,

    /// Neo4j database name
    #[arg(long, env = "NEO4J_DATABASE", default_value = "neo4j")]
    pub neo4j_database: String,
}
