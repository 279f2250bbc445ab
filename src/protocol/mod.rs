use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::app::App;
use crate::error::{CoreError, Result, ValidationErrors};
use crate::services::{
    combine, favorites, filter_task, intake, listing, search, update,
};

mod command;
pub use command::Command;

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload(req: &Value) -> &Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn err(id: Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into()
    })
    .to_string()
}

fn core_err(id: Value, e: &CoreError) -> String {
    match e {
        CoreError::Validation(errors) => json!({
            "id": id,
            "status": "error",
            "message": "validation failed",
            "errors": errors
        })
        .to_string(),
        other => err(id, other.to_string()),
    }
}

/// Null payloads read as `{}` so forms fall back to their defaults.
fn parse<T: DeserializeOwned>(payload: &Value) -> Result<T> {
    let value = if payload.is_null() { json!({}) } else { payload.clone() };
    serde_json::from_value(value).map_err(|e| {
        let mut errors = ValidationErrors::new();
        errors.add_non_field(format!("invalid payload: {e}"));
        CoreError::Validation(errors)
    })
}

fn require_id(payload: &Value, key: &str) -> Result<u64> {
    payload.get(key).and_then(|v| v.as_u64()).ok_or_else(|| {
        let mut errors = ValidationErrors::new();
        errors.add_field(key, "this field is required");
        CoreError::Validation(errors)
    })
}

fn str_field<'a>(payload: &'a Value, key: &str) -> &'a str {
    payload.get(key).and_then(|v| v.as_str()).unwrap_or("")
}

fn to_value<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn dispatch(app: &App, cmd: Command, payload: &Value) -> Result<Value> {
    match cmd {
        Command::Ping => Ok(json!({ "message": "corpus-core alive" })),

        Command::LanguageList => Ok(json!({ "languages": app.catalog.all() })),

        Command::DatasetCreate => {
            let form: intake::DatasetForm = parse(payload)?;
            let dataset = intake::create(app, &form)?;
            Ok(json!({ "dataset": dataset }))
        }

        Command::DatasetValidate => {
            let form: intake::DatasetForm = parse(payload)?;
            intake::validate(app, &form)?;
            Ok(json!({ "valid": true }))
        }

        Command::DatasetGet => {
            let dataset = app.store.get_dataset(require_id(payload, "id")?)?;
            Ok(json!({ "dataset": dataset }))
        }

        Command::DatasetList => {
            let query: listing::DatasetListQuery = parse(payload)?;
            Ok(json!({ "datasets": listing::list(app, &query)? }))
        }

        Command::DatasetUpdate => {
            let id = require_id(payload, "id")?;
            let form: update::DatasetUpdateForm = parse(payload)?;
            Ok(json!({ "dataset": update::update(app, id, &form)? }))
        }

        Command::DatasetFormLayout => {
            let dataset = app.store.get_dataset(require_id(payload, "id")?)?;
            Ok(json!({ "fields": to_value(update::form_layout(&dataset))? }))
        }

        Command::DatasetDelete => {
            let id = require_id(payload, "id")?;
            update::delete(app, id)?;
            Ok(json!({ "deleted": id }))
        }

        Command::DatasetCombine => {
            let form: combine::CombineForm = parse(payload)?;
            Ok(json!({ "dataset": combine::combine(app, &form)? }))
        }

        Command::PhraseSearch => {
            let form: search::PhraseSearchForm = parse(payload)?;
            Ok(json!({ "hits": search::search(app, &form)? }))
        }

        Command::FavoriteAdd => {
            let form: favorites::FavoriteForm = parse(payload)?;
            Ok(json!({ "favorite": favorites::add(app, &form)? }))
        }

        Command::FavoriteList => {
            let dataset = match payload.get("dataset_id").and_then(|v| v.as_u64()) {
                Some(id) => Some(app.store.get_dataset(id)?),
                None => None,
            };
            Ok(json!({ "favorites": favorites::choices(app, dataset.as_ref())? }))
        }

        Command::FavoriteSearch => {
            let form: favorites::FavoriteSearchForm = parse(payload)?;
            Ok(json!({ "hits": favorites::search(app, &form)? }))
        }

        Command::FilterCreate => {
            let form: filter_task::FilterForm = parse(payload)?;
            Ok(json!({ "filter": filter_task::create_filter(app, &form)? }))
        }

        Command::FilterList => Ok(json!({ "filters": filter_task::list_filters(app)? })),

        Command::FilterTaskCreate => {
            let form: filter_task::FilterTaskForm = parse(payload)?;
            Ok(json!({ "task": filter_task::create_task(app, &form)? }))
        }

        Command::FilterTaskList => {
            let tasks = filter_task::list_tasks(app, str_field(payload, "order"))?;
            Ok(json!({ "tasks": tasks }))
        }

        Command::FilterTaskRun => {
            let task = filter_task::run_task(app, require_id(payload, "id")?)?;
            Ok(json!({ "task": task }))
        }

        Command::Unknown(name) => Err(CoreError::UnknownCommand(name)),
    }
}

pub fn handle(app: &App, input: &str) -> String {
    let req: Value = match serde_json::from_str(input) {
        Ok(v) => v,
        Err(_) => {
            return json!({
                "status": "error",
                "message": "invalid json"
            })
            .to_string();
        }
    };

    let id = get_id(&req);
    let cmd_str = get_cmd(&req);
    let payload = get_payload(&req);

    match dispatch(app, Command::from(cmd_str), payload) {
        Ok(payload) => ok(id, payload),
        Err(e) => {
            tracing::debug!(cmd = cmd_str, error = %e, "request failed");
            core_err(id, &e)
        }
    }
}
