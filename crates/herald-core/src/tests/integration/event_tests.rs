#![cfg(test)]

use std::sync::{Arc, Mutex};
use std::thread;

use serde_json::{Value, json};

use super::common::{Article, RecordingListener, entries, new_log};
use crate::event::{
    AttachOptions, Callable, EventData, EventDispatcher, EventManager, EventSystemError, Handler,
};
use crate::kernel::bootstrap::Application;
use crate::kernel::error::{Error as KernelError, Result as KernelResult};

#[test]
fn test_model_save_runs_global_then_local_listeners() -> KernelResult<()> {
    let app = Application::new()?;
    let log = new_log();

    let audit = Arc::new(RecordingListener::new("audit", &log).on("Model.beforeSave", "record"));
    app.global_manager()?.attach(audit, None, AttachOptions::default())?;

    let article = Article::new("Hello", app.local_manager()?);
    let validation = Arc::new(
        RecordingListener::new("validation", &log)
            .on("Model.beforeSave", vec![
                Handler::new("checkTitle").priority(5),
                Handler::new("checkBody"),
            ])
            .returning("checkBody", json!("valid")),
    );
    article.event_manager().attach(validation, None, AttachOptions::default())?;

    let event = article.save()?;
    assert_eq!(
        entries(&log),
        vec![
            "validation.checkTitle(Model.beforeSave)",
            "audit.record(Model.beforeSave)",
            "validation.checkBody(Model.beforeSave)",
        ]
    );
    assert_eq!(event.result(), Some(&json!("valid")));
    assert!(!event.is_stopped());
    Ok(())
}

#[test]
fn test_subject_is_reachable_from_listener() -> KernelResult<()> {
    let app = Application::new()?;
    let article = Article::new("Subject test", app.local_manager()?);
    let seen = Arc::new(Mutex::new(None));

    let seen_clone = Arc::clone(&seen);
    article.event_manager().attach(
        Callable::from_event(move |event| {
            let title = event.subject::<Article>().map(|article| article.title.clone());
            *seen_clone.lock().unwrap() = title;
            Ok(None)
        }),
        Some("Model.beforeSave"),
        AttachOptions::default(),
    )?;

    let event = article.save()?;
    assert_eq!(seen.lock().unwrap().as_deref(), Some("Subject test"));

    // The event does not keep its subject alive.
    drop(article);
    assert!(event.subject::<Article>().is_none());
    Ok(())
}

#[test]
fn test_vetoing_listener_stops_the_save() -> KernelResult<()> {
    let app = Application::new()?;
    let log = new_log();
    let article = Article::new("", app.local_manager()?);

    article.event_manager().attach(
        Callable::from_params(|params| {
            let empty = params.first().and_then(Value::as_str).is_some_and(str::is_empty);
            Ok(if empty { Some(Value::Bool(false)) } else { None })
        }),
        Some("Model.beforeSave"),
        AttachOptions::new().priority(1).pass_params(true),
    )?;
    let later = Arc::new(RecordingListener::new("later", &log).on("Model.beforeSave", "afterVeto"));
    article.event_manager().attach(later, None, AttachOptions::default())?;

    let event = article.save()?;
    assert!(event.is_stopped());
    assert_eq!(event.result(), Some(&Value::Bool(false)));
    assert!(entries(&log).is_empty());
    Ok(())
}

#[test]
fn test_detached_subscriber_no_longer_runs() -> KernelResult<()> {
    let app = Application::new()?;
    let log = new_log();
    let manager = app.local_manager()?;

    let listener = Arc::new(
        RecordingListener::new("cache", &log)
            .on("Model.afterSave", "clear")
            .on("Model.afterDelete", "clear"),
    );
    manager.attach(Arc::clone(&listener), None, AttachOptions::default())?;

    assert_eq!(manager.detach(Arc::clone(&listener), Some("Model.afterSave"))?, 1);
    manager.dispatch("Model.afterSave")?;
    manager.dispatch("Model.afterDelete")?;
    assert_eq!(entries(&log), vec!["cache.clear(Model.afterDelete)"]);

    assert_eq!(manager.detach(listener, None)?, 1);
    assert!(manager.event_names()?.is_empty());
    Ok(())
}

#[test]
fn test_unknown_handler_surfaces_as_listener_failure() -> KernelResult<()> {
    let app = Application::new()?;
    let log = new_log();
    let manager = app.local_manager()?;

    let listener = Arc::new(RecordingListener::new("broken", &log).on("Model.afterSave", "exists"));
    manager.attach(listener.clone(), None, AttachOptions::default())?;
    // Route a plain callable to a handler the listener never declared.
    let target = Arc::clone(&listener);
    manager.attach(
        Callable::new(move |invocation| {
            crate::event::EventListener::handle(target.as_ref(), "missing", invocation)
        }),
        Some("Model.afterSave"),
        AttachOptions::default(),
    )?;

    let err: KernelError = manager.dispatch("Model.afterSave").unwrap_err().into();
    match err {
        KernelError::EventSystem(EventSystemError::ListenerFailed { event_name, source }) => {
            assert_eq!(event_name, "Model.afterSave");
            assert_eq!(source.to_string(), "Listener does not provide a handler named 'missing'");
        }
        other => panic!("Expected ListenerFailed, got {:?}", other),
    }
    assert_eq!(entries(&log), vec!["broken.exists(Model.afterSave)"]);
    Ok(())
}

#[test]
fn test_dispatch_event_helper_spreads_data() -> KernelResult<()> {
    let app = Application::new()?;
    let log = new_log();
    let article = Article::new("Spread", app.local_manager()?);

    let listener = Arc::new(
        RecordingListener::new("spread", &log)
            .on("Article.published", Handler::new("announce").pass_params(true)),
    );
    article.event_manager().attach(listener, None, AttachOptions::default())?;

    let mut data = EventData::new();
    data.insert("id".to_string(), json!(7));
    data.insert("slug".to_string(), json!("spread"));
    article.dispatch_event("Article.published", data)?;

    assert_eq!(entries(&log), vec![r#"spread.announce[7,"spread"]"#]);
    Ok(())
}

#[test]
fn test_replaced_global_seen_by_existing_local_managers() -> KernelResult<()> {
    let app = Application::new()?;
    let local = app.local_manager()?;

    app.global_manager()?.attach(
        Callable::from_event(|_event| Ok(Some(json!("old")))),
        Some("ping"),
        AttachOptions::default(),
    )?;
    assert_eq!(local.dispatch("ping")?.result(), Some(&json!("old")));

    let replacement = EventManager::new();
    replacement.attach(
        Callable::from_event(|_event| Ok(Some(json!("new")))),
        Some("ping"),
        AttachOptions::default(),
    )?;
    app.set_global_manager(replacement)?;

    assert_eq!(local.dispatch("ping")?.result(), Some(&json!("new")));
    Ok(())
}

#[test]
fn test_global_manager_shared_across_threads() -> KernelResult<()> {
    let app = Application::new()?;
    let counter = Arc::new(Mutex::new(0));

    let counter_clone = Arc::clone(&counter);
    app.global_manager()?.attach(
        Callable::from_event(move |_event| {
            *counter_clone.lock().unwrap() += 1;
            Ok(None)
        }),
        Some("tick"),
        AttachOptions::default(),
    )?;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let manager = app.local_manager().expect("local manager");
            thread::spawn(move || manager.dispatch("tick").map(|_| ()))
        })
        .collect();
    for handle in handles {
        handle.join().expect("dispatch thread panicked")?;
    }

    assert_eq!(*counter.lock().unwrap(), 4);
    Ok(())
}

#[test]
fn test_tracking_through_settings_records_all_dispatches() -> KernelResult<()> {
    let app = Application::with_settings(crate::config::EventSettings {
        default_priority: 10,
        track_events: true,
    })?;
    let article = Article::new("Tracked", app.local_manager()?);

    article.save()?;
    article.event_manager().dispatch("Model.afterSave")?;

    let list = app.global_manager()?.event_list()?.expect("global should be tracking");
    let names: Vec<&str> = list.iter().map(|event| event.name()).collect();
    assert_eq!(names, vec!["Model.beforeSave", "Model.afterSave"]);
    assert_eq!(list.get(0).and_then(|event| event.get("title")), Some(&json!("Tracked")));
    Ok(())
}
