//! Builds a small page with nested islands and walks it through its
//! activation sequence.
//!
//! Run with: cargo run --example lazy_page

use reef_engine::host::Rect;
use reef_engine::{Config, Engine};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .init();

    let engine = Engine::new(Config::default());
    let doc = engine.document();

    // <is-land on:load>
    //   <is-land on:visible>
    //     <my-carousel><img></my-carousel>
    //     <template data-island><p>deferred caption</p></template>
    //   </is-land>
    // </is-land>
    let (outer, inner, carousel) = {
        let mut d = doc.borrow_mut();
        let root = d.root();
        let outer = d.create_element("is-land");
        d.set_attr(outer, "on:load", "");
        d.tree_mut().append_child(root, outer);

        let inner = d.create_element("is-land");
        d.set_attr(inner, "on:visible", "");
        d.tree_mut().append_child(outer, inner);

        let carousel = d.create_element("my-carousel");
        let img = d.create_element("img");
        d.tree_mut().append_child(carousel, img);
        d.tree_mut().append_child(inner, carousel);

        let tmpl = d.create_element("template");
        d.set_attr(tmpl, "data-island", "");
        let content = d.template_content(tmpl);
        let caption = d.create_element("p");
        let text = d.create_text("deferred caption");
        d.tree_mut().append_child(caption, text);
        d.tree_mut().append_child(content, caption);
        d.tree_mut().append_child(inner, tmpl);

        (outer, inner, carousel)
    };

    let islands = engine.scan();
    engine.settle();
    println!(
        "after attach: {} islands, carousel masked: {}",
        islands.len(),
        !doc.borrow().tree().is_connected(carousel)
    );

    engine.host().lifecycle().fire_load();
    engine.settle();
    println!(
        "after load: outer ready: {}, inner ready: {}",
        doc.borrow().has_attr(outer, "ready"),
        doc.borrow().has_attr(inner, "ready"),
    );

    // the inner island scrolls into view
    engine.host().intersection().set_rect(inner, Rect::new(0.0, 40.0, 800.0, 300.0));
    engine.settle();
    println!(
        "after scroll: inner ready: {}, carousel restored: {}",
        doc.borrow().has_attr(inner, "ready"),
        doc.borrow().tree().is_connected(carousel)
    );
    println!(
        "inner markup: {}",
        reef_dom::serialize_children(doc.borrow().tree(), inner)
    );
}
