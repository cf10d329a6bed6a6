use crate::adapters::rest::{extract_count, QueryOutcome, RestClient};
use crate::config::defaults::{RelationshipExpectation, TableExpectation};
use crate::domain::model::{DiagnosticResult, DiagnosticStage, Finding};
use crate::domain::ports::{ConnectivityProbe, DiagnosticCheck, ProbeOutcome};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 對單一已知資料表做 count 查詢
pub struct TableCountProbe {
    client: RestClient,
    table: String,
}

impl TableCountProbe {
    pub fn new(client: RestClient, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }
}

#[async_trait]
impl ConnectivityProbe for TableCountProbe {
    async fn check(&self) -> Result<ProbeOutcome> {
        match self.client.count(&self.table).await? {
            QueryOutcome::Rows(rows) => Ok(ProbeOutcome::Reachable {
                count: extract_count(&rows),
            }),
            QueryOutcome::Rejected(detail) => Ok(ProbeOutcome::Rejected(detail)),
        }
    }

    fn target(&self) -> &str {
        &self.table
    }
}

/// 檢查預期的資料表與欄位是否存在
pub struct StructureCheck {
    client: RestClient,
    tables: Vec<TableExpectation>,
}

impl StructureCheck {
    pub fn new(client: RestClient, tables: Vec<TableExpectation>) -> Self {
        Self { client, tables }
    }
}

#[async_trait]
impl DiagnosticCheck for StructureCheck {
    fn stage(&self) -> DiagnosticStage {
        DiagnosticStage::StructuralCheck
    }

    fn name(&self) -> &str {
        "structure"
    }

    async fn run(&self) -> Result<DiagnosticResult> {
        let mut findings = Vec::with_capacity(self.tables.len());

        for expectation in &self.tables {
            let finding = match self
                .client
                .probe_columns(&expectation.table, &expectation.columns)
                .await?
            {
                QueryOutcome::Rows(_) => Finding::pass(
                    &expectation.table,
                    format!("table present ({} columns checked)", expectation.columns.len()),
                ),
                QueryOutcome::Rejected(detail) => Finding::fail(&expectation.table, detail.message),
            };
            tracing::debug!("structure {}: ok={}", finding.subject, finding.ok);
            findings.push(finding);
        }

        Ok(DiagnosticResult::from_findings(self.stage(), findings))
    }
}

/// 檢查外鍵關聯能否以嵌入查詢解析
pub struct RelationshipCheck {
    client: RestClient,
    relationships: Vec<RelationshipExpectation>,
}

impl RelationshipCheck {
    pub fn new(client: RestClient, relationships: Vec<RelationshipExpectation>) -> Self {
        Self {
            client,
            relationships,
        }
    }
}

#[async_trait]
impl DiagnosticCheck for RelationshipCheck {
    fn stage(&self) -> DiagnosticStage {
        DiagnosticStage::RelationshipCheck
    }

    fn name(&self) -> &str {
        "relationships"
    }

    async fn run(&self) -> Result<DiagnosticResult> {
        let mut findings = Vec::with_capacity(self.relationships.len());

        for relationship in &self.relationships {
            let finding = match self
                .client
                .probe_embed(&relationship.from, &relationship.to)
                .await?
            {
                QueryOutcome::Rows(_) => Finding::pass(relationship.label(), "relationship resolvable"),
                QueryOutcome::Rejected(detail) => Finding::fail(relationship.label(), detail.message),
            };
            tracing::debug!("relationship {}: ok={}", finding.subject, finding.ok);
            findings.push(finding);
        }

        Ok(DiagnosticResult::from_findings(self.stage(), findings))
    }
}
