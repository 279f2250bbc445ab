mod common;

use common::{env, form, Env};
use corpus_core::model::dataset::Dataset;
use corpus_core::model::filter::TaskStatus;
use corpus_core::services::combine::{self, CombineForm};
use corpus_core::services::favorites::{self, FavoriteForm, FavoriteSearchForm};
use corpus_core::services::filter_task::{self, FilterForm, FilterTaskForm};
use corpus_core::services::intake;
use corpus_core::services::listing::{self, DatasetListQuery};
use corpus_core::services::search::{self, MatchMode, PhraseSearchForm};
use corpus_core::services::update;
use corpus_core::CoreError;

fn parallel(env: &Env, title: &str, from: &str, to: &str, src: &str, tgt: &str) -> Dataset {
    let mut f = form(title, from, Some(to));
    f.source_file = Some(env.upload(&format!("{title}.{from}"), src));
    f.target_file = Some(env.upload(&format!("{title}.{to}"), tgt));
    intake::create(&env.app, &f).unwrap()
}

fn favorite(env: &Env, from: &str, to: &str, lf: &str, lt: Option<&str>) -> u64 {
    favorites::add(
        &env.app,
        &FavoriteForm {
            phrase_from: from.into(),
            phrase_to: to.into(),
            language_from: lf.into(),
            language_to: lt.map(str::to_string),
        },
    )
    .unwrap()
    .id
}

#[test]
fn phrase_search_matches_either_side() {
    let env = env();
    let d = parallel(
        &env,
        "greet",
        "en",
        "de",
        "Good morning\nGood night\nThank you\n",
        "Guten Morgen\nGute Nacht\nDanke\n",
    );

    let hits = search::search(
        &env.app,
        &PhraseSearchForm {
            dataset_id: Some(d.id),
            phrase_from: Some("good".into()),
            match_mode: MatchMode::StartsWith,
            ..Default::default()
        },
    )
    .unwrap();
    let lines: Vec<usize> = hits.iter().map(|h| h.line).collect();
    assert_eq!(lines, vec![1, 2]);

    let hits = search::search(
        &env.app,
        &PhraseSearchForm {
            dataset_id: Some(d.id),
            phrase_from: Some("good".into()),
            phrase_to: Some("nacht".into()),
            match_mode: MatchMode::Partial,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].target.as_deref(), Some("Gute Nacht"));
}

#[test]
fn blank_source_lines_keep_pairs_aligned() {
    let env = env();
    let d = parallel(&env, "pets", "en", "de", "hello\n\ncat\ndog\n", "hallo\nkatze\nhund\n");
    assert_eq!(d.sentence_count, 3);

    let hits = search::search(
        &env.app,
        &PhraseSearchForm {
            dataset_id: Some(d.id),
            phrase_from: Some("dog".into()),
            match_mode: MatchMode::Exact,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].line, 4);
    assert_eq!(hits[0].target.as_deref(), Some("hund"));

    let more = parallel(&env, "more", "en", "de", "bird\n", "Vogel\n");
    let combined = combine::combine(
        &env.app,
        &CombineForm {
            title: "zoo".into(),
            dataset_ids: vec![d.id, more.id],
        },
    )
    .unwrap();
    let source = env.app.store.file_path(&combined.source_file);
    let target = env.app.store.file_path(combined.target_file.as_ref().unwrap());
    assert_eq!(std::fs::read_to_string(source).unwrap(), "hello\ncat\ndog\nbird\n");
    assert_eq!(std::fs::read_to_string(target).unwrap(), "hallo\nkatze\nhund\nVogel\n");

    let filter = filter_task::create_filter(
        &env.app,
        &FilterForm {
            title: "d words".into(),
            pattern: Some("^d".into()),
            ..Default::default()
        },
    )
    .unwrap();
    let task = filter_task::create_task(
        &env.app,
        &FilterTaskForm {
            title: "dogs".into(),
            filter_id: Some(filter.id),
            dataset_id: Some(d.id),
            save_filter: true,
        },
    )
    .unwrap();
    let done = filter_task::run_task(&env.app, task.id).unwrap();
    let result = env.app.store.get_dataset(done.result_dataset_id.unwrap()).unwrap();
    let target = env.app.store.file_path(result.target_file.as_ref().unwrap());
    assert_eq!(std::fs::read_to_string(target).unwrap(), "hund\n");
}

#[test]
fn search_without_dataset_is_a_field_error() {
    let env = env();
    let err = search::search(
        &env.app,
        &PhraseSearchForm {
            phrase_from: Some("hello".into()),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(err.validation_errors().unwrap().has_field("dataset_id"));
}

#[test]
fn empty_phrases_fail_validation() {
    let env = env();
    let err = search::search(
        &env.app,
        &PhraseSearchForm {
            dataset_id: Some(1),
            phrase_from: Some(String::new()),
            phrase_to: Some(String::new()),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(!err.validation_errors().unwrap().non_field.is_empty());
}

#[test]
fn favorite_choices_follow_dataset_language_pair() {
    let env = env();
    let en_de = parallel(&env, "a", "en", "de", "Hello there\n", "Hallo\n");
    let en_fr = parallel(&env, "b", "en", "fr", "Hello\n", "Bonjour\n");

    let hello_de = favorite(&env, "hello", "hallo", "en", Some("de"));
    let hello_fr = favorite(&env, "hello", "bonjour", "en", Some("fr"));
    favorite(&env, "hola", "", "es", None);

    let ids: Vec<u64> = favorites::choices(&env.app, Some(&en_de))
        .unwrap()
        .iter()
        .map(|f| f.id)
        .collect();
    assert_eq!(ids, vec![hello_de]);

    let ids: Vec<u64> = favorites::choices(&env.app, Some(&en_fr))
        .unwrap()
        .iter()
        .map(|f| f.id)
        .collect();
    assert_eq!(ids, vec![hello_fr]);

    assert_eq!(favorites::choices(&env.app, None).unwrap().len(), 3);

    let hits = favorites::search(
        &env.app,
        &FavoriteSearchForm {
            favorite_id: hello_de,
            dataset_id: en_de.id,
            match_mode: MatchMode::Partial,
            limit: None,
        },
    )
    .unwrap();
    assert_eq!(hits.len(), 1);

    let err = favorites::search(
        &env.app,
        &FavoriteSearchForm {
            favorite_id: hello_fr,
            dataset_id: en_de.id,
            match_mode: MatchMode::Partial,
            limit: None,
        },
    )
    .unwrap_err();
    assert!(err.validation_errors().unwrap().has_field("favorite_id"));
}

#[test]
fn listing_filters_and_orders() {
    let env = env();
    parallel(&env, "zeta", "en", "de", "a\nb\n", "c\nd\n");
    parallel(&env, "alpha", "en", "fr", "a\n", "b\n");
    parallel(&env, "beta", "fr", "de", "a\nb\nc\n", "d\ne\nf\n");

    let rows = listing::list(
        &env.app,
        &DatasetListQuery {
            order: "-sentence_count".into(),
            ..Default::default()
        },
    )
    .unwrap();
    let titles: Vec<&str> = rows.iter().map(|d| d.title.as_str()).collect();
    assert_eq!(titles, vec!["beta", "zeta", "alpha"]);

    let rows = listing::list(
        &env.app,
        &DatasetListQuery {
            target_language: Some("de".into()),
            order: "title".into(),
            ..Default::default()
        },
    )
    .unwrap();
    let titles: Vec<&str> = rows.iter().map(|d| d.title.as_str()).collect();
    assert_eq!(titles, vec!["beta", "zeta"]);

    let rows = listing::list(
        &env.app,
        &DatasetListQuery {
            title_contains: Some("ALP".into()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(rows.len(), 1);
}

#[test]
fn combine_concatenates_matching_pairs() {
    let env = env();
    let a = parallel(&env, "a", "en", "de", "one\ntwo\n", "eins\nzwei\n");
    let b = parallel(&env, "b", "en", "de", "three\n", "drei\n");

    let combined = combine::combine(
        &env.app,
        &CombineForm {
            title: "all".into(),
            dataset_ids: vec![a.id, b.id],
        },
    )
    .unwrap();

    assert_eq!(combined.sentence_count, 3);
    assert_eq!(combined.target_language.as_deref(), Some("de"));
    let target = env.app.store.file_path(combined.target_file.as_ref().unwrap());
    assert_eq!(std::fs::read_to_string(target).unwrap(), "eins\nzwei\ndrei\n");
    assert_eq!(env.staging_entries(), 0);
}

#[test]
fn combine_rejects_mixed_pairs_and_single_inputs() {
    let env = env();
    let a = parallel(&env, "a", "en", "de", "one\n", "eins\n");
    let b = parallel(&env, "b", "en", "fr", "one\n", "un\n");

    let err = combine::combine(
        &env.app,
        &CombineForm {
            title: "mixed".into(),
            dataset_ids: vec![a.id, b.id],
        },
    )
    .unwrap_err();
    assert_eq!(
        err.validation_errors().unwrap().non_field,
        vec!["all datasets must share the same language pair"]
    );

    let err = combine::combine(
        &env.app,
        &CombineForm {
            title: "one".into(),
            dataset_ids: vec![a.id, a.id, 99],
        },
    )
    .unwrap_err();
    assert_eq!(err.validation_errors().unwrap().field("dataset_ids").len(), 2);
}

#[test]
fn filter_task_runs_and_discards_unsaved_filter() {
    let env = env();
    let d = parallel(
        &env,
        "corpus",
        "en",
        "de",
        "Hi\nThis is fine\nThis is fine\nfar too many words in this one line\n",
        "Hallo\nDas passt\nDas passt\nviel zu viele Wörter in dieser Zeile\n",
    );

    let filter = filter_task::create_filter(
        &env.app,
        &FilterForm {
            title: "short".into(),
            min_words: Some(2),
            max_words: Some(5),
            pattern: None,
            skip_duplicates: true,
        },
    )
    .unwrap();

    let task = filter_task::create_task(
        &env.app,
        &FilterTaskForm {
            title: "clean".into(),
            filter_id: Some(filter.id),
            dataset_id: Some(d.id),
            save_filter: false,
        },
    )
    .unwrap();
    assert_eq!(task.status, TaskStatus::Pending);

    let done = filter_task::run_task(&env.app, task.id).unwrap();
    assert_eq!(done.status, TaskStatus::Done);

    let result = env.app.store.get_dataset(done.result_dataset_id.unwrap()).unwrap();
    assert_eq!(result.sentence_count, 1);
    let target = env.app.store.file_path(result.target_file.as_ref().unwrap());
    assert_eq!(std::fs::read_to_string(target).unwrap(), "Das passt\n");

    assert!(filter_task::list_filters(&env.app).unwrap().is_empty());
    assert!(filter_task::run_task(&env.app, task.id).is_err());
}

#[test]
fn saved_filters_survive_and_tasks_validate_references() {
    let env = env();
    let d = parallel(&env, "c", "en", "de", "a b\n", "c d\n");
    let filter = filter_task::create_filter(
        &env.app,
        &FilterForm {
            title: "keep".into(),
            pattern: Some("^a".into()),
            ..Default::default()
        },
    )
    .unwrap();

    let err = filter_task::create_task(
        &env.app,
        &FilterTaskForm {
            title: "bad".into(),
            filter_id: Some(99),
            dataset_id: None,
            save_filter: true,
        },
    )
    .unwrap_err();
    let errors = err.validation_errors().unwrap();
    assert!(errors.has_field("filter_id"));
    assert!(errors.has_field("dataset_id"));

    let task = filter_task::create_task(
        &env.app,
        &FilterTaskForm {
            title: "ok".into(),
            filter_id: Some(filter.id),
            dataset_id: Some(d.id),
            save_filter: true,
        },
    )
    .unwrap();
    filter_task::run_task(&env.app, task.id).unwrap();
    assert_eq!(filter_task::list_filters(&env.app).unwrap().len(), 1);

    let bad = filter_task::create_filter(
        &env.app,
        &FilterForm {
            title: "broken".into(),
            min_words: Some(4),
            max_words: Some(1),
            pattern: Some("(".into()),
            ..Default::default()
        },
    )
    .unwrap_err();
    let errors = bad.validation_errors().unwrap();
    assert!(errors.has_field("pattern"));
    assert!(errors.has_field("max_words"));

    let tasks = filter_task::list_tasks(&env.app, "-title").unwrap();
    assert_eq!(tasks.len(), 1);
    assert!(filter_task::list_tasks(&env.app, "sentence_count").is_err());
}

#[test]
fn deleted_records_do_not_hand_their_ids_to_new_ones() {
    let env = env();
    let d = parallel(&env, "c", "en", "de", "a b\n", "c d\n");

    let once = filter_task::create_filter(
        &env.app,
        &FilterForm {
            title: "once".into(),
            ..Default::default()
        },
    )
    .unwrap();
    let task = filter_task::create_task(
        &env.app,
        &FilterTaskForm {
            title: "first".into(),
            filter_id: Some(once.id),
            dataset_id: Some(d.id),
            save_filter: false,
        },
    )
    .unwrap();
    let done = filter_task::run_task(&env.app, task.id).unwrap();
    assert!(filter_task::list_filters(&env.app).unwrap().is_empty());

    let other = filter_task::create_filter(
        &env.app,
        &FilterForm {
            title: "other".into(),
            ..Default::default()
        },
    )
    .unwrap();
    assert_ne!(other.id, done.filter_id);

    let pending = filter_task::create_task(
        &env.app,
        &FilterTaskForm {
            title: "second".into(),
            filter_id: Some(other.id),
            dataset_id: Some(d.id),
            save_filter: false,
        },
    )
    .unwrap();

    update::delete(&env.app, d.id).unwrap();
    let task_ids: Vec<u64> = filter_task::list_tasks(&env.app, "")
        .unwrap()
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(task_ids, vec![done.id]);
    assert!(filter_task::list_filters(&env.app).unwrap().is_empty());

    let fresh = parallel(&env, "unrelated", "en", "fr", "x\n", "y\n");
    assert_ne!(fresh.id, d.id);
    assert!(matches!(
        filter_task::run_task(&env.app, pending.id),
        Err(CoreError::NotFound { kind: "filter task", .. })
    ));
}
