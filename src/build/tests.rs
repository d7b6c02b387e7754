//! End-to-end unit builds over in-memory sources.

use super::*;
use crate::build::loader::MemoryLoader;
use crate::compose::ReplacementError;
use crate::output;
use crate::recipe::{AttributeEdit, ClassDirective, ClassEdit, Replacement, ReservedIds};
use tempfile::TempDir;

const BASE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg"
     xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape"
     xmlns:sodipodi="http://sodipodi.sourceforge.net/DTD/sodipodi-0.dtd"
     width="16" height="16" viewBox="0 0 16 16">
  <defs id="defs1"/>
  <sodipodi:namedview inkscape:pagecheckerboard="true"/>
  <!-- drawing area -->
  <g id="content"/>
  <rect id="guides" width="16" height="16" fill="none"/>
</svg>"#;

const TEMPLATE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg">
  <defs>
    <linearGradient id="shine"><stop offset="1" stop-color="#fff"/></linearGradient>
  </defs>
  <path id="page" class="ColorScheme-Text icon-24" style="fill:currentColor;fill-opacity:1;-inkscape-font-specification:Sans" d="M3 1h7l3 3v11H3z"/>
  <circle id="badge" cx="12" cy="12" r="3.00001" fill="url(#shine)"/>
</svg>"##;

const PLUS: &str = r#"<svg xmlns="http://www.w3.org/2000/svg"><path d="M11 9h2v2h2v2h-2v2h-2v-2H9v-2h2z"/></svg>"#;

fn loader() -> MemoryLoader {
    MemoryLoader::default()
        .with("bases/square.16.svg", BASE)
        .with("templates/edit-copy.svg", TEMPLATE)
        .with("badges/plus.16.svg", PLUS)
}

fn recipe(name: &str) -> Recipe {
    Recipe {
        name: name.into(),
        base: "bases/square".into(),
        template: "templates/edit-copy.svg".into(),
        sizes: vec!["16".into()],
        context: "Actions".into(),
        folder: "actions".into(),
        remove: vec!["#guides".into()],
        css_suffixes: vec!["-24".into()],
        ..Default::default()
    }
}

fn shared_inputs() -> (Palette, OptimizeOptions) {
    let palette = [("accent", "'#3daee9'")].into_iter().collect();
    let options = OptimizeOptions {
        reserved: ReservedIds::from_iter(["current-color-scheme"]),
        ..Default::default()
    };
    (palette, options)
}

fn tag_names(svg: &str) -> Vec<&str> {
    svg.split('<')
        .skip(1)
        .filter(|tag| !tag.starts_with(['?', '/']))
        .map(|tag| tag.split([' ', '/', '>']).next().unwrap_or(""))
        .collect()
}

#[test]
fn test_merge_places_template_content() {
    let mut doc = Document::parse(BASE).unwrap();
    let template = Document::parse(TEMPLATE).unwrap();
    merge_at(&mut doc, INSERTION_POINT, &template).unwrap();

    assert!(doc.find_id("content").is_none());
    let page = doc.find_id("page").unwrap();
    let badge = doc.find_id("badge").unwrap();
    assert_eq!(doc.parent(page), Some(doc.root()));
    assert_eq!(doc.index_in_parent(badge), doc.index_in_parent(page).map(|i| i + 1));

    let shine = doc.find_id("shine").unwrap();
    let defs = doc.parent(shine).unwrap();
    assert_eq!(doc.element(defs).unwrap().id(), Some("defs1"));
}

#[test]
fn test_build_unit_end_to_end() {
    let (palette, options) = shared_inputs();
    let mut recipe = recipe("edit-copy");
    recipe.replacements.push(Replacement {
        selector: "#badge".into(),
        source: "badges/plus.{size}.svg".into(),
        placement: None,
    });
    recipe.class_edits.push(ClassEdit {
        selector: "#page".into(),
        directive: ClassDirective::parse("+icon-base"),
    });
    recipe.attribute_edits.push(AttributeEdit {
        selector: "path".into(),
        attrs: vec![("stroke".into(), "@accent".into())],
    });

    let report = build_unit(
        &recipe,
        "16",
        Shared {
            palette: &palette,
            options: &options,
        },
        &loader(),
    );
    assert_eq!((report.icon.as_str(), report.size.as_str()), ("edit-copy", "16"));
    let svg = report.outcome.unwrap();

    assert!(svg.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?><svg"#), "{svg}");
    assert!(!svg.contains("style="), "{svg}");
    assert!(!svg.contains("<!--"), "{svg}");
    assert!(tag_names(&svg).iter().all(|name| !name.contains(':')), "{svg}");
    assert!(!svg.contains("inkscape") && !svg.contains("sodipodi"), "{svg}");

    // style hoisted, suffix stripped, alias resolved on both paths
    assert_eq!(svg.matches(r#"fill="currentColor""#).count(), 1, "{svg}");
    assert!(svg.contains(r#"class="ColorScheme-Text icon icon-base""#), "{svg}");
    assert_eq!(svg.matches(r##"stroke="#3daee9""##).count(), 2, "{svg}");

    // replaced badge is gone with its gradient, guides removed
    assert!(!svg.contains("<circle") && !svg.contains("Gradient"), "{svg}");
    assert!(!svg.contains("guides") && !svg.contains("<rect"), "{svg}");
    assert!(svg.contains(r#"d="M11 9h2v2h2v2h-2v2h-2v-2H9v-2h2z""#), "{svg}");
}

#[test]
fn test_insertion_point_failure_is_a_compose_failure() {
    let (palette, options) = shared_inputs();
    let loader = loader().with("bases/round.16.svg", "<svg><g/></svg>");
    let mut recipe = recipe("edit-copy");
    recipe.base = "bases/round".into();

    let report = build_unit(
        &recipe,
        "16",
        Shared {
            palette: &palette,
            options: &options,
        },
        &loader,
    );
    let failure = report.outcome.unwrap_err();
    assert_eq!(failure.stage, Stage::Compose);
    assert_eq!(failure.error.offender(), Some(INSERTION_POINT));
}

#[test]
fn test_missing_base_is_a_load_failure() {
    let (palette, options) = shared_inputs();
    let report = build_unit(
        &recipe("edit-copy"),
        "22",
        Shared {
            palette: &palette,
            options: &options,
        },
        &loader(),
    );
    let failure = report.outcome.unwrap_err();
    assert_eq!(failure.stage, Stage::Load);
    assert_eq!(failure.error.offender(), Some("bases/square.22.svg"));
    assert!(failure.to_string().starts_with("load: cannot read `bases/square.22.svg`"));
}

#[test]
fn test_failure_is_isolated_within_a_batch() {
    let (palette, options) = shared_inputs();
    let good = recipe("edit-copy");
    let mut broken = recipe("edit-cut");
    broken.replacements.push(Replacement {
        selector: "#badge".into(),
        source: "badges/scissors.{size}.svg".into(),
        placement: None,
    });
    let recipes = vec![broken, good];
    let units = Unit::all(&recipes);
    let seen = std::sync::atomic::AtomicUsize::new(0);

    let reports = build_batch(
        &units,
        Shared {
            palette: &palette,
            options: &options,
        },
        &loader(),
        |_| {
            seen.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        },
    );
    assert_eq!(seen.into_inner(), 2);
    assert_eq!(reports.len(), 2);

    let failure = reports[0].outcome.as_ref().unwrap_err();
    assert_eq!(failure.stage, Stage::Compose);
    assert!(matches!(
        failure.error,
        BuildError::Replacement(ReplacementError::MissingSource { .. })
    ));
    assert_eq!(failure.error.offender(), Some("badges/scissors.16.svg"));

    let dir = TempDir::new().unwrap();
    for (report, recipe) in reports.iter().zip(&recipes) {
        if let Ok(svg) = &report.outcome {
            let path = output::icon_path(dir.path(), &recipe.folder, &report.size, &report.icon);
            output::write_icon(&path, svg).unwrap();
        }
    }
    assert!(dir.path().join("actions/16/edit-copy.svg").is_file());
    assert!(!dir.path().join("actions/16/edit-cut.svg").exists());
}
