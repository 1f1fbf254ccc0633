use anyhow::Result;
use chrono::NaiveDate;
use finfocus_indices::{
    GitHubPublisher, HttpDocumentSource, IndexDefinition, IndexKind, IndexUpdater, IndicesError,
    LocalStorage, PublishTarget, UpdateOutcome,
};
use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;

fn bcra_page(date: &str, value: &str) -> String {
    format!(
        r#"<html><body>
        <table class="table table-BCRA">
          <tr><th>Principales variables</th><th>Fecha</th><th>Valor</th></tr>
          <tr><td>Base monetaria - Total (en millones de pesos)</td><td>30/07/2025</td><td>37.004.581</td></tr>
          <tr><td><a href="Serie.asp?serie=3540">CER (Base 2.2.2002=1)</a></td><td>{}</td><td>{}</td></tr>
        </table>
        </body></html>"#,
        date, value
    )
}

fn cer_definition(server: &MockServer) -> IndexDefinition {
    IndexDefinition {
        source_url: server.url("/PublicacionesEstadisticas/Principales_variables.asp"),
        ..IndexDefinition::defaults(IndexKind::Cer)
    }
}

fn target(api: &MockServer) -> PublishTarget {
    PublishTarget {
        repo: "owner/finfocus-indices".to_string(),
        branch: "main".to_string(),
        api_base: api.base_url(),
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 8, 1).unwrap()
}

#[tokio::test]
async fn test_cer_appends_and_is_idempotent() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::create_dir_all(temp_dir.path().join("indices"))?;
    std::fs::write(
        temp_dir.path().join("indices/cer.json"),
        "{\n  \"2025-07-30\": 614.1525\n}",
    )?;

    let source = MockServer::start();
    source.mock(|when, then| {
        when.method(GET).path("/PublicacionesEstadisticas/Principales_variables.asp");
        then.status(200).body(bcra_page("31/07/2025", "614,7532"));
    });

    let api = MockServer::start();
    let get_sha = api.mock(|when, then| {
        when.method(GET)
            .path("/repos/owner/finfocus-indices/contents/indices/cer.json");
        then.status(200).json_body(json!({"sha": "aaaa"}));
    });
    let put = api.mock(|when, then| {
        when.method(PUT)
            .path("/repos/owner/finfocus-indices/contents/indices/cer.json")
            .json_body_partial(r#"{"sha": "aaaa", "message": "Actualiza CER index"}"#);
        then.status(200).json_body(json!({"content": {"sha": "bbbb"}}));
    });

    let publisher =
        GitHubPublisher::new(&api.base_url(), Some("token".to_string()), Duration::from_secs(5))?;
    let updater = IndexUpdater::new(
        HttpDocumentSource::new(Duration::from_secs(5), false)?,
        LocalStorage::new(temp_dir.path()),
    )
    .with_publisher(publisher, target(&api));

    let first = updater.run_index(&cer_definition(&source), today()).await?;
    assert_eq!(first.outcome.inserted(), &[NaiveDate::from_ymd_opt(2025, 7, 31).unwrap()]);

    let written = std::fs::read_to_string(temp_dir.path().join("indices/cer.json"))?;
    assert_eq!(
        written,
        "{\n  \"2025-07-30\": 614.1525,\n  \"2025-07-31\": 614.7532\n}"
    );

    let second = updater.run_index(&cer_definition(&source), today()).await?;
    assert_eq!(second.outcome, UpdateOutcome::Unchanged);
    assert_eq!(
        std::fs::read_to_string(temp_dir.path().join("indices/cer.json"))?,
        written
    );

    get_sha.assert_hits(1);
    put.assert_hits(1);

    Ok(())
}

#[tokio::test]
async fn test_cer_existing_date_is_not_overwritten() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::create_dir_all(temp_dir.path().join("indices"))?;
    let original = "{\n  \"2025-07-31\": 614.7532\n}";
    std::fs::write(temp_dir.path().join("indices/cer.json"), original)?;

    let source = MockServer::start();
    source.mock(|when, then| {
        when.method(GET).path("/PublicacionesEstadisticas/Principales_variables.asp");
        then.status(200).body(bcra_page("31/07/2025", "999,0"));
    });

    let updater: IndexUpdater<_, _, GitHubPublisher> = IndexUpdater::new(
        HttpDocumentSource::new(Duration::from_secs(5), false)?,
        LocalStorage::new(temp_dir.path()),
    );

    let report = updater.run_index(&cer_definition(&source), today()).await?;

    assert_eq!(report.outcome, UpdateOutcome::Unchanged);
    assert_eq!(report.observation.rate, 999.0);
    assert_eq!(
        std::fs::read_to_string(temp_dir.path().join("indices/cer.json"))?,
        original
    );

    Ok(())
}

#[tokio::test]
async fn test_cer_conflict_is_fatal_but_local_file_is_kept() -> Result<()> {
    let temp_dir = TempDir::new()?;

    let source = MockServer::start();
    source.mock(|when, then| {
        when.method(GET).path("/PublicacionesEstadisticas/Principales_variables.asp");
        then.status(200).body(bcra_page("31/07/2025", "614,7532"));
    });

    let api = MockServer::start();
    api.mock(|when, then| {
        when.method(GET);
        then.status(200).json_body(json!({"sha": "stale"}));
    });
    api.mock(|when, then| {
        when.method(PUT);
        then.status(409)
            .json_body(json!({"message": "indices/cer.json does not match stale"}));
    });

    let publisher =
        GitHubPublisher::new(&api.base_url(), Some("token".to_string()), Duration::from_secs(5))?;
    let updater = IndexUpdater::new(
        HttpDocumentSource::new(Duration::from_secs(5), false)?,
        LocalStorage::new(temp_dir.path()),
    )
    .with_publisher(publisher, target(&api));

    let result = updater.run_index(&cer_definition(&source), today()).await;

    let error = result.unwrap_err();
    assert!(matches!(error, IndicesError::ConflictError { .. }));
    assert_ne!(error.exit_code(), 0);
    assert_eq!(
        std::fs::read_to_string(temp_dir.path().join("indices/cer.json"))?,
        "{\n  \"2025-07-31\": 614.7532\n}"
    );

    Ok(())
}

#[tokio::test]
async fn test_cer_missing_token_fails_only_when_publishing() -> Result<()> {
    let temp_dir = TempDir::new()?;

    let source = MockServer::start();
    source.mock(|when, then| {
        when.method(GET).path("/PublicacionesEstadisticas/Principales_variables.asp");
        then.status(200).body(bcra_page("31/07/2025", "614,7532"));
    });
    let api = MockServer::start();

    let publisher = GitHubPublisher::new(&api.base_url(), None, Duration::from_secs(5))?;
    let updater = IndexUpdater::new(
        HttpDocumentSource::new(Duration::from_secs(5), false)?,
        LocalStorage::new(temp_dir.path()),
    )
    .with_publisher(publisher, target(&api));

    let result = updater.run_index(&cer_definition(&source), today()).await;
    assert!(matches!(result, Err(IndicesError::MissingConfigError { .. })));

    // Same page again: nothing new, so no publish and no token needed.
    let report = updater.run_index(&cer_definition(&source), today()).await?;
    assert_eq!(report.outcome, UpdateOutcome::Unchanged);

    Ok(())
}

#[tokio::test]
async fn test_source_outage_is_fatal_before_any_write() -> Result<()> {
    let temp_dir = TempDir::new()?;

    let source = MockServer::start();
    source.mock(|when, then| {
        when.method(GET).path("/PublicacionesEstadisticas/Principales_variables.asp");
        then.status(502);
    });

    let updater: IndexUpdater<_, _, GitHubPublisher> = IndexUpdater::new(
        HttpDocumentSource::new(Duration::from_secs(5), false)?,
        LocalStorage::new(temp_dir.path()),
    );

    let result = updater.run_index(&cer_definition(&source), today()).await;

    assert!(matches!(
        result,
        Err(IndicesError::UnexpectedStatusError { status: 502, .. })
    ));
    assert!(!temp_dir.path().join("indices/cer.json").exists());

    Ok(())
}
