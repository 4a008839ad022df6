use std::sync::Arc;

use cw_types::Projection;

use crate::error::{StoreError, StoreResult};
use crate::gateway::StoreGateway;
use crate::graph::{MappingRef, Triple};
use crate::intern::InternPolicy;
use crate::results::Row;
use crate::sparql;
use crate::traits::GraphStore;

/// [`GraphStore`] backed by the SPARQL store behind a [`StoreGateway`].
#[derive(Clone, Debug)]
pub struct SparqlStore {
    gateway: Arc<StoreGateway>,
}

impl SparqlStore {
    /// Wrap a shared gateway.
    pub fn new(gateway: Arc<StoreGateway>) -> Self {
        Self { gateway }
    }

    /// The gateway used for every statement.
    pub fn gateway(&self) -> &StoreGateway {
        &self.gateway
    }

    fn select(&self, query: &str) -> StoreResult<Vec<Row>> {
        Ok(self.gateway.run_query(query, false)?.rows())
    }

    fn update(&self, update: &str) -> StoreResult<()> {
        self.gateway.run_query(update, true).map(|_| ())
    }
}

fn term(row: &Row, var: &str) -> StoreResult<String> {
    row.get(var)
        .ok_or_else(|| StoreError::Decode(format!("missing binding for ?{var}")))?
        .term()
        .map(str::to_string)
}

impl GraphStore for SparqlStore {
    fn lookup(&self, read: &[String], projection: &Projection) -> StoreResult<Vec<String>> {
        let rows = self.select(&sparql::lookup_query(read, projection)?)?;
        rows.iter().map(|row| term(row, "s")).collect()
    }

    fn insert(&self, graph: &str, subject: &str, projection: &Projection) -> StoreResult<()> {
        self.update(&sparql::insert_data(graph, subject, projection)?)
    }

    fn describe(&self, read: &[String], subject: &str) -> StoreResult<Vec<(String, String)>> {
        let rows = self.select(&sparql::describe_query(read, subject))?;
        let mut pairs = rows
            .iter()
            .map(|row| Ok((term(row, "p")?, term(row, "o")?)))
            .collect::<StoreResult<Vec<_>>>()?;
        pairs.sort();
        pairs.dedup();
        Ok(pairs)
    }

    fn notation(&self, subject: &str) -> StoreResult<Option<String>> {
        let rows = self.select(&sparql::notation_query(subject))?;
        rows.first().map(|row| term(row, "notation")).transpose()
    }

    fn triples(&self, graphs: &[String]) -> StoreResult<Vec<Triple>> {
        let rows = self.select(&sparql::triples_query(graphs))?;
        let mut triples = rows
            .iter()
            .map(|row| Ok(Triple::new(term(row, "s")?, term(row, "p")?, term(row, "o")?)))
            .collect::<StoreResult<Vec<_>>>()?;
        triples.sort();
        triples.dedup();
        Ok(triples)
    }

    fn remove_common(&self, branch: &str, main: &str) -> StoreResult<()> {
        self.update(&sparql::rebase_update(branch, main))
    }

    fn add_graph(&self, from: &str, into: &str) -> StoreResult<()> {
        self.update(&sparql::add_update(from, into))
    }

    fn drop_graph(&self, graph: &str) -> StoreResult<()> {
        self.update(&sparql::drop_update(graph))
    }

    fn remove_subject(&self, graph: &str, subject: &str) -> StoreResult<()> {
        self.update(&sparql::remove_subject_update(graph, subject))
    }

    fn current_mappings(
        &self,
        read: &[String],
        source_type: &str,
        target_type: &str,
    ) -> StoreResult<Vec<MappingRef>> {
        let rows = self.select(&sparql::current_mappings_query(read, source_type, target_type)?)?;
        rows.iter()
            .map(|row| {
                Ok(MappingRef {
                    uri: term(row, "mapping")?,
                    invertible: row
                        .get("invertible")
                        .map(|b| b.term().is_ok_and(|t| t == "\"True\""))
                        .unwrap_or(false),
                })
            })
            .collect()
    }

    fn intern_policy(&self) -> InternPolicy {
        self.gateway.config().intern_policy()
    }
}
