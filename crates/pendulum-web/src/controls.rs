use crate::app::App;
use crate::dom::{self, js_err};
use pendulum_core::{ParamKind, ParamSpec, PARAMS};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Populate `#inputs` with one control per parameter.
pub fn build_inputs(document: &web::Document, app: &Rc<RefCell<App>>) -> anyhow::Result<()> {
    let form = document
        .get_element_by_id("inputs")
        .ok_or_else(|| anyhow::anyhow!("missing #inputs"))?;
    for spec in PARAMS {
        let field = match spec.kind {
            ParamKind::Range { min, max, step } => {
                range_field(document, spec, [min, max, step], app)?
            }
            ParamKind::Menu { values } => menu_field(document, spec, values, app)?,
        };
        form.append_child(&field).map_err(js_err)?;
    }
    Ok(())
}

fn container(document: &web::Document) -> anyhow::Result<web::Element> {
    let div = document.create_element("div").map_err(js_err)?;
    div.class_list().add_1("input-container").map_err(js_err)?;
    Ok(div)
}

fn range_field(
    document: &web::Document,
    spec: &'static ParamSpec,
    [min, max, step]: [f64; 3],
    app: &Rc<RefCell<App>>,
) -> anyhow::Result<web::Element> {
    let div = container(document)?;

    let label = document.create_element("p").map_err(js_err)?;
    label.class_list().add_1("input-label").map_err(js_err)?;
    label.set_text_content(Some(&format!("{}: ", spec.label)));
    let value = document.create_element("span").map_err(js_err)?;
    value.set_text_content(Some(spec.default));
    label.append_child(&value).map_err(js_err)?;

    let input = document
        .create_element("input")
        .map_err(js_err)?
        .dyn_into::<web::HtmlInputElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
    input.class_list().add_1("input-range").map_err(js_err)?;
    input.set_type("range");
    input.set_name(spec.key);
    input.set_min(&min.to_string());
    input.set_max(&max.to_string());
    input.set_step(&step.to_string());
    input.set_value(spec.default);

    div.append_child(&label).map_err(js_err)?;
    div.append_child(&input).map_err(js_err)?;

    let app = app.clone();
    let source = input.clone();
    dom::add_listener(&input, "input", move |_| {
        let raw = source.value();
        value.set_text_content(Some(&raw));
        app.borrow_mut().apply_control(spec.key, &raw);
    });
    Ok(div)
}

fn menu_field(
    document: &web::Document,
    spec: &'static ParamSpec,
    values: &'static [&'static str],
    app: &Rc<RefCell<App>>,
) -> anyhow::Result<web::Element> {
    let div = container(document)?;
    let select = document
        .create_element("select")
        .map_err(js_err)?
        .dyn_into::<web::HtmlSelectElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
    select.class_list().add_1("input-menu").map_err(js_err)?;
    select.set_name(spec.key);
    for v in values {
        let option = document
            .create_element("option")
            .map_err(js_err)?
            .dyn_into::<web::HtmlOptionElement>()
            .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
        option.set_value(v);
        option.set_text(v);
        select.append_child(&option).map_err(js_err)?;
    }
    select.set_value(spec.default);
    div.append_child(&select).map_err(js_err)?;

    let app = app.clone();
    let source = select.clone();
    dom::add_listener(&select, "change", move |_| {
        app.borrow_mut().apply_control(spec.key, &source.value());
    });
    Ok(div)
}

/// `#status` plays/pauses, `#toggle` opens/closes `#options`.
pub fn wire_buttons(document: &web::Document, app: &Rc<RefCell<App>>) {
    let app = app.clone();
    dom::add_click_listener(document, "status", move || app.borrow_mut().toggle());

    let options = document.get_element_by_id("options");
    dom::add_click_listener(document, "toggle", move || {
        if let Some(el) = &options {
            let classes = el.class_list();
            let _ = classes.toggle("close");
            let _ = classes.toggle("open");
        }
    });
}

/// Space toggles play; resizing refits the canvas.
pub fn wire_window(window: &web::Window, app: &Rc<RefCell<App>>) {
    let keys = app.clone();
    dom::add_listener(window, "keydown", move |ev| {
        let Some(key) = ev.dyn_ref::<web::KeyboardEvent>() else {
            return;
        };
        if key.key() == " " && !dom::from_form_control(&ev) {
            ev.prevent_default();
            keys.borrow_mut().toggle();
        }
    });

    let resize = app.clone();
    dom::add_listener(window, "resize", move |_| resize.borrow_mut().resize());
}
