use crate::db::exports::{list_recent_exports, record_export};
use crate::errors::ServerError;
use crate::export::{ExportError, ExportReport, ReportDocument, ShareOutcome};
use crate::history::session::local_now;
use crate::history::{Projection, Tab};
use crate::responses::{html_response, pdf_response, ResultResp};
use crate::state::AppState;
use crate::templates::pages::{
    export_saved_page, history_page, report_page, success_page, HistoryVm,
};
use astra::Request;
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

const RECENT_EXPORTS: usize = 5;

pub fn handle(req: Request, state: &AppState) -> ResultResp {
    let method = req.method().as_str();
    let path = req.uri().path();
    let params = parse_query(&req);

    match (method, path) {
        ("GET", "/") | ("GET", "/history") => history(state, &params),
        ("GET", "/report") => report(state, &params),
        ("GET", "/export") => export(state, &params),
        ("GET", "/export/preview") => preview(state, &params),
        ("GET", "/success") => html_response(success_page()),
        _ => Err(ServerError::NotFound),
    }
}

fn history(state: &AppState, params: &HashMap<String, String>) -> ResultResp {
    let tab = tab_param(params)?;

    let (projection, total_records, feed_error, subscribed) = {
        let mut session = state.session.lock().map_err(|_| ServerError::InternalError)?;

        if params.contains_key("reconnect") && !session.is_subscribed() {
            session.resubscribe(state.feed.as_ref());
        }
        if let Err(e) = session.pump() {
            log::warn!("history feed error: {e}");
        }

        let projection = session.select_tab(tab).clone();
        (
            projection,
            session.snapshot_len(),
            session.last_error().map(|e| e.to_string()),
            session.is_subscribed(),
        )
    };

    let recent_exports = state
        .db
        .with_conn(|conn| list_recent_exports(conn, RECENT_EXPORTS))?;

    html_response(history_page(&HistoryVm {
        projection: &projection,
        total_records,
        feed_error,
        subscribed,
        recent_exports: &recent_exports,
    }))
}

fn report(state: &AppState, params: &HashMap<String, String>) -> ResultResp {
    let id = params
        .get("id")
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ServerError::BadRequest("missing id".into()))?;

    let record = {
        let mut session = state.session.lock().map_err(|_| ServerError::InternalError)?;
        if let Err(e) = session.pump() {
            log::warn!("history feed error: {e}");
        }
        session.record(id).cloned()
    };

    match record {
        Some(record) => html_response(report_page(&record)),
        None => Err(ServerError::NotFound),
    }
}

fn export(state: &AppState, params: &HashMap<String, String>) -> ResultResp {
    let tab = tab_param(params)?;

    let projection = current_projection(state, tab)?;

    let result = {
        let mut exporter = state.exporter.lock().map_err(|_| ServerError::InternalError)?;
        exporter.run(&projection)
    };

    log_export(state, tab, projection.len(), &result)?;

    let report = result?;
    match report.share {
        ShareOutcome::Shared => {
            // Each request serves the artifact its own run produced.
            let artifact = &report.artifact;
            let bytes = std::fs::read(artifact.path()).map_err(|e| {
                ServerError::Export(ExportError::Share(format!(
                    "read {}: {e}",
                    artifact.path().display()
                )))
            })?;
            pdf_response(bytes, &artifact.file_name())
        }
        ShareOutcome::Unavailable => html_response(export_saved_page(&report)),
    }
}

/// The export's table as HTML, without running the pipeline.
fn preview(state: &AppState, params: &HashMap<String, String>) -> ResultResp {
    let tab = tab_param(params)?;
    let projection = current_projection(state, tab)?;
    let document = ReportDocument::build(&projection.records, tab, local_now());
    html_response(document.markup())
}

fn current_projection(state: &AppState, tab: Tab) -> Result<Projection, ServerError> {
    let mut session = state.session.lock().map_err(|_| ServerError::InternalError)?;
    if let Err(e) = session.pump() {
        log::warn!("history feed error: {e}");
    }
    Ok(session.select_tab(tab).clone())
}

fn log_export(
    state: &AppState,
    tab: Tab,
    rows: usize,
    result: &Result<ExportReport, ExportError>,
) -> Result<(), ServerError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);

    let (outcome, message, artifact) = match result {
        Ok(report) => (
            match report.share {
                ShareOutcome::Shared => "shared",
                ShareOutcome::Unavailable => "saved",
            },
            report.persist_error.as_ref().map(|e| e.to_string()),
            Some(report.artifact.path().to_string_lossy().into_owned()),
        ),
        Err(e) => (e.kind(), Some(e.to_string()), None),
    };

    state.db.with_conn(|conn| {
        record_export(
            conn,
            tab.as_str(),
            rows,
            outcome,
            message.as_deref(),
            artifact.as_deref(),
            now,
        )
    })?;
    Ok(())
}

fn tab_param(params: &HashMap<String, String>) -> Result<Tab, ServerError> {
    match params.get("tab") {
        Some(t) => t.parse().map_err(ServerError::BadRequest),
        None => Ok(Tab::default()),
    }
}

fn parse_query(req: &Request) -> HashMap<String, String> {
    req.uri()
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}
