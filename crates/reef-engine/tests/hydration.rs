//! End-to-end activation tests: condition gating, ancestor ordering,
//! and strategy execution through the full engine.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use reef_dom::{Document, NodeId};
use reef_engine::{Config, Engine};
use reef_host::StaticLoader;

fn init_logs() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn append_island(doc: &Rc<RefCell<Document>>, parent: NodeId, attrs: &[(&str, &str)]) -> NodeId {
    let mut d = doc.borrow_mut();
    let el = d.create_element("is-land");
    for (name, value) in attrs {
        d.set_attr(el, name, value);
    }
    d.tree_mut().append_child(parent, el);
    el
}

fn append_el(doc: &Rc<RefCell<Document>>, parent: NodeId, tag: &str) -> NodeId {
    let mut d = doc.borrow_mut();
    let el = d.create_element(tag);
    d.tree_mut().append_child(parent, el);
    el
}

#[test]
fn unconditioned_island_resolves_without_events() {
    init_logs();
    let engine = Engine::new(Config::default());
    let doc = engine.document();
    let root = doc.borrow().root();
    let el = append_island(&doc, root, &[]);

    let island = engine.attach(el);
    engine.settle();

    assert!(island.is_ready());
    assert!(doc.borrow().has_attr(el, "ready"));
}

#[test]
fn nested_island_never_ready_before_conditioned_ancestor() {
    init_logs();
    let engine = Engine::new(Config::default());
    let doc = engine.document();
    let root = doc.borrow().root();
    let outer = append_island(&doc, root, &[("on:interaction", "")]);
    let inner = append_island(&doc, outer, &[("on:visible", "")]);

    let islands = engine.scan();
    assert_eq!(islands.len(), 2);
    let outer_island = engine.hydrator().island_for(outer);
    let inner_island = engine.hydrator().island_for(inner);

    // the child observes the parent's marker at its own resolution
    let observed = Rc::new(Cell::new(false));
    {
        let observed = Rc::clone(&observed);
        let doc = engine.document();
        let outer_island = Rc::clone(&outer_island);
        let inner_island = Rc::clone(&inner_island);
        engine
            .spawn(async move {
                inner_island.wait().await;
                assert!(outer_island.is_ready());
                assert!(doc.borrow().has_attr(outer, "ready"));
                observed.set(true);
            })
            .detach();
    }

    engine.settle();

    // the child's own condition settles first; the ancestor still gates it
    engine.host().intersection().intersect(inner);
    engine.settle();
    assert!(!inner_island.is_ready());
    assert!(!doc.borrow().has_attr(inner, "ready"));

    Document::dispatch_event(&doc, outer, "click");
    engine.settle();
    assert!(outer_island.is_ready());
    assert!(inner_island.is_ready());
    assert!(observed.get());
}

#[test]
fn visible_condition_resolves_once_and_detaches_observer() {
    init_logs();
    let engine = Engine::new(Config::default());
    let doc = engine.document();
    let root = doc.borrow().root();
    let el = append_island(&doc, root, &[("on:visible", "")]);

    let island = engine.attach(el);
    engine.settle();
    assert!(engine.host().intersection().is_observed(el));
    assert!(!island.is_ready());

    engine.host().intersection().intersect(el);
    engine.settle();
    assert!(island.is_ready());
    assert_eq!(engine.host().intersection().deliveries(), 1);
    assert!(!engine.host().intersection().is_observed(el));

    // a second intersection goes nowhere
    engine.host().intersection().intersect(el);
    assert_eq!(engine.host().intersection().deliveries(), 1);
}

#[test]
fn media_condition_shares_one_future_across_islands() {
    init_logs();
    let engine = Engine::new(Config::default());
    let doc = engine.document();
    let root = doc.borrow().root();
    let query = "(min-width: 600px)";
    let a = append_island(&doc, root, &[("on:media", query)]);
    let b = append_island(&doc, root, &[("on:media", query)]);

    let islands = engine.scan();
    engine.settle();
    assert!(islands.iter().all(|i| !i.is_ready()));

    // islands registered their interest; one shared signal exists
    let watch_a = engine.host().media().watch(query);
    let watch_b = engine.host().media().watch(query);
    assert!(watch_a.same_signal(&watch_b));

    // a single match resolves both islands together
    engine.host().media().set_matches(query, true);
    engine.settle();
    assert!(doc.borrow().has_attr(a, "ready"));
    assert!(doc.borrow().has_attr(b, "ready"));
}

#[test]
fn save_data_mismatch_stays_pending_forever() {
    init_logs();
    let engine = Engine::new(Config {
        save_data: Some(true),
        ..Config::default()
    });
    let doc = engine.document();
    let root = doc.borrow().root();
    let el = append_island(&doc, root, &[("on:save-data", "false")]);

    let island = engine.attach(el);
    engine.settle();
    assert!(!island.is_ready());

    // no event exists that could settle it; repeated scheduling
    // windows leave it pending
    for _ in 0..3 {
        engine.settle();
    }
    let pending = engine.block_on(futures_lite::future::poll_once(island.wait()));
    assert!(pending.is_none());
    assert!(!doc.borrow().has_attr(el, "ready"));
}

#[test]
fn save_data_matching_preference_resolves() {
    let engine = Engine::new(Config {
        save_data: Some(true),
        ..Config::default()
    });
    let doc = engine.document();
    let root = doc.borrow().root();
    let el = append_island(&doc, root, &[("on:save-data", "true")]);

    let island = engine.attach(el);
    engine.settle();
    assert!(island.is_ready());
}

#[test]
fn load_condition_waits_for_load_event() {
    let engine = Engine::new(Config::default());
    let doc = engine.document();
    let root = doc.borrow().root();
    let el = append_island(&doc, root, &[("on:load", "")]);

    let island = engine.attach(el);
    engine.settle();
    assert!(!island.is_ready());

    engine.host().lifecycle().fire_load();
    engine.settle();
    assert!(island.is_ready());
}

#[test]
fn load_condition_on_complete_document_resolves_immediately() {
    let engine = Engine::new(Config::default());
    engine.host().lifecycle().fire_load();

    let doc = engine.document();
    let root = doc.borrow().root();
    let el = append_island(&doc, root, &[("on:load", "")]);

    let island = engine.attach(el);
    engine.settle();
    assert!(island.is_ready());
}

#[test]
fn idle_condition_requires_idle_and_load() {
    let engine = Engine::new(Config::default());
    let doc = engine.document();
    let root = doc.borrow().root();
    let el = append_island(&doc, root, &[("on:idle", "")]);

    let island = engine.attach(el);
    engine.settle();

    engine.host().lifecycle().fire_idle();
    engine.settle();
    assert!(!island.is_ready());

    engine.host().lifecycle().fire_load();
    engine.settle();
    assert!(island.is_ready());
}

#[test]
fn idle_without_capability_degrades_to_load_only() {
    let engine = Engine::new(Config {
        idle_callback: false,
        ..Config::default()
    });
    let doc = engine.document();
    let root = doc.borrow().root();
    let el = append_island(&doc, root, &[("on:idle", "")]);

    let island = engine.attach(el);
    engine.settle();
    assert!(!island.is_ready());

    engine.host().lifecycle().fire_load();
    engine.settle();
    assert!(island.is_ready());
}

#[test]
fn interaction_condition_with_override_list() {
    let engine = Engine::new(Config::default());
    let doc = engine.document();
    let root = doc.borrow().root();
    let el = append_island(&doc, root, &[("on:interaction", "mouseenter,focusin")]);

    let island = engine.attach(el);
    engine.settle();
    assert_eq!(doc.borrow().listener_count(el), 2);

    // an unlisted trigger does nothing
    Document::dispatch_event(&doc, el, "click");
    engine.settle();
    assert!(!island.is_ready());

    Document::dispatch_event(&doc, el, "focusin");
    engine.settle();
    assert!(island.is_ready());
    // remaining listeners were cleaned up with the fired one
    assert_eq!(doc.borrow().listener_count(el), 0);
}

#[test]
fn multiple_conditions_all_must_settle() {
    let engine = Engine::new(Config::default());
    let doc = engine.document();
    let root = doc.borrow().root();
    let el = append_island(&doc, root, &[("on:visible", ""), ("on:interaction", "")]);

    let island = engine.attach(el);
    engine.settle();

    engine.host().intersection().intersect(el);
    engine.settle();
    assert!(!island.is_ready());

    Document::dispatch_event(&doc, el, "click");
    engine.settle();
    assert!(island.is_ready());
}

#[test]
fn unknown_strategy_type_still_completes() {
    let engine = Engine::new(Config::default());
    let doc = engine.document();
    let root = doc.borrow().root();
    let el = append_island(&doc, root, &[("type", "marko")]);

    let island = engine.attach(el);
    engine.settle();
    assert!(island.is_ready());
}

#[test]
fn registered_strategy_runs_with_module_and_node() {
    let loader = Rc::new(StaticLoader::new());
    let engine = Engine::with_loader(Config::default(), Rc::clone(&loader) as _);
    engine.add_init_type(
        "counter",
        Rc::new(|ctx| {
            Box::pin(async move {
                let module = ctx.module.as_ref().map(|m| m.specifier().to_string());
                ctx.document.borrow_mut().set_attr(
                    ctx.node,
                    "data-initialized",
                    module.as_deref().unwrap_or(""),
                );
                Ok(())
            })
        }),
    );

    let doc = engine.document();
    let root = doc.borrow().root();
    let el = append_island(
        &doc,
        root,
        &[("type", "counter"), ("import", "./counter.js")],
    );

    let island = engine.attach(el);
    engine.settle();
    assert!(island.is_ready());
    assert_eq!(
        doc.borrow().attr(el, "data-initialized"),
        Some("./counter.js")
    );
    assert_eq!(loader.served(), vec!["./counter.js".to_string()]);
}

#[test]
fn bare_import_runs_default_strategy() {
    let loader = Rc::new(StaticLoader::new());
    let engine = Engine::with_loader(Config::default(), Rc::clone(&loader) as _);
    let doc = engine.document();
    let root = doc.borrow().root();
    let el = append_island(&doc, root, &[("import", "./widget.js")]);

    let island = engine.attach(el);
    engine.settle();
    assert!(island.is_ready());
    assert_eq!(loader.served(), vec!["./widget.js".to_string()]);
}

#[test]
fn failed_import_leaves_island_unready_and_masked() {
    init_logs();
    let loader = Rc::new(StaticLoader::new());
    loader.deny("./broken.js");
    let engine = Engine::with_loader(Config::default(), Rc::clone(&loader) as _);

    let doc = engine.document();
    let root = doc.borrow().root();
    let el = append_island(
        &doc,
        root,
        &[("on:interaction", ""), ("import", "./broken.js")],
    );
    let widget = append_el(&doc, el, "my-widget");

    let island = engine.attach(el);
    engine.settle();

    // masked while waiting
    assert!(!doc.borrow().tree().is_connected(widget));

    Document::dispatch_event(&doc, el, "click");
    engine.settle();

    // the strategy error propagated; the island never reached Ready
    // and the masked content conservatively stays inert
    assert!(!island.is_ready());
    assert!(!doc.borrow().has_attr(el, "ready"));
    assert!(!doc.borrow().tree().is_connected(widget));
}

#[test]
fn failing_strategy_leaves_island_unready() {
    init_logs();
    let engine = Engine::new(Config::default());
    engine.add_init_type(
        "broken",
        Rc::new(|_ctx| Box::pin(async { anyhow::bail!("mount exploded") })),
    );

    let doc = engine.document();
    let root = doc.borrow().root();
    let el = append_island(&doc, root, &[("type", "broken")]);

    let island = engine.attach(el);
    engine.settle();

    assert!(!island.is_ready());
    assert!(!doc.borrow().has_attr(el, "ready"));
}

#[test]
fn ready_when_resolves_after_every_enclosing_island() {
    let engine = Engine::new(Config::default());
    let doc = engine.document();
    let root = doc.borrow().root();
    let outer = append_island(&doc, root, &[("on:load", "")]);
    let inner = append_island(&doc, outer, &[("on:visible", "")]);
    let leaf = append_el(&doc, inner, "span");

    engine.scan();
    engine.settle();

    let done = Rc::new(Cell::new(false));
    {
        let done = Rc::clone(&done);
        let wait = engine.ready_when(leaf);
        engine
            .spawn(async move {
                wait.await;
                done.set(true);
            })
            .detach();
    }

    engine.host().intersection().intersect(inner);
    engine.settle();
    assert!(!done.get());

    engine.host().lifecycle().fire_load();
    engine.settle();
    assert!(done.get());
}

#[test]
fn ready_when_outside_islands_resolves_immediately() {
    let engine = Engine::new(Config::default());
    let doc = engine.document();
    let root = doc.borrow().root();
    let loose = append_el(&doc, root, "div");

    let done = Rc::new(Cell::new(false));
    let done2 = Rc::clone(&done);
    let wait = engine.ready_when(loose);
    engine
        .spawn(async move {
            wait.await;
            done2.set(true);
        })
        .detach();
    engine.settle();
    assert!(done.get());
}
