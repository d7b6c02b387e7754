//! Cookbook loading.
//!
//! A cookbook is one `*.cookbook.toml` file. Loading it yields the palette,
//! the optimizer settings and a fully resolved [`Recipe`] per
//! `[recipes.<name>]` table, in file order.
//!
//! # Resolution
//!
//! | Key                               | Recipe     | Fallback                     |
//! |-----------------------------------|------------|------------------------------|
//! | `sizes`, `context`, `folder`, `base` | overrides | `[defaults]`, then `[]`, `Generic`, `generic`, `undefined` |
//! | `classes`, `attrs`, `replace`     | appended   | `[defaults]` entries first   |
//! | `remove`                          | appended   | `[cookbook]`, then `[defaults]` |
//!
//! Unknown keys are reported as warnings and otherwise ignored.

pub mod error;
mod section;

pub use error::ConfigError;

use crate::build::FsLoader;
use crate::log;
use crate::optimize::{DEFAULT_PRECISION, OptimizeOptions};
use crate::recipe::{
    AttributeEdit, ClassDirective, ClassEdit, Palette, Placement, Recipe, Replacement,
};
use jwalk::WalkDir;
use section::{CookbookFile, CookbookSection, RecipeSection};
use std::fs;
use std::path::{Path, PathBuf};

type Result<T> = std::result::Result<T, ConfigError>;

/// File name suffix that marks a cookbook.
pub const COOKBOOK_SUFFIX: &str = ".cookbook.toml";

const DEFAULT_CONTEXT: &str = "Generic";
const DEFAULT_FOLDER: &str = "generic";
const DEFAULT_BASE: &str = "undefined";

/// Offset used when a placed replacement omits `x` or `y`.
const DEFAULT_OFFSET: &str = "0";

/// One loaded cookbook.
#[derive(Debug, Clone)]
pub struct Cookbook {
    /// The cookbook file.
    pub path: PathBuf,
    /// Directory every recipe path is relative to.
    pub dir: PathBuf,
    pub palette: Palette,
    pub options: OptimizeOptions,
    pub recipes: Vec<Recipe>,
}

impl Cookbook {
    /// Load a cookbook file, warning about unknown keys.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (cookbook, ignored) = Self::parse_with_ignored(&content, path)?;
        if !ignored.is_empty() {
            print_unknown_fields_warning(&ignored, path);
        }
        Ok(cookbook)
    }

    /// Parse cookbook text as if it were read from `path`.
    pub fn from_str(content: &str, path: &Path) -> Result<Self> {
        Self::parse_with_ignored(content, path).map(|(cookbook, _)| cookbook)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str, path: &Path) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let file: CookbookFile = serde_ignored::deserialize(deserializer, |field| {
            ignored.push(field.to_string());
        })?;

        let mut recipes = Vec::with_capacity(file.recipes.len());
        for (name, value) in file.recipes {
            let section: RecipeSection = serde_ignored::deserialize(value, |field| {
                ignored.push(format!("recipes.{name}.{field}"));
            })?;
            recipes.push(resolve(&name, section, &file.defaults, &file.cookbook)?);
        }

        let options = OptimizeOptions {
            precision: file.cookbook.precision.unwrap_or(DEFAULT_PRECISION),
            reserved: file.cookbook.reserved_ids.iter().collect(),
        };

        let cookbook = Self {
            path: path.to_path_buf(),
            dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            palette: palette(file.palette)?,
            options,
            recipes,
        };
        Ok((cookbook, ignored))
    }

    /// File name without the cookbook suffix.
    pub fn name(&self) -> String {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match file_name.strip_suffix(COOKBOOK_SUFFIX) {
            Some(stem) => stem.to_string(),
            None => file_name,
        }
    }

    /// Source loader rooted at the cookbook's directory.
    pub fn loader(&self) -> FsLoader {
        FsLoader::new(&self.dir)
    }

    /// Keep only the named recipes. An empty filter keeps everything.
    pub fn retain_recipes(&mut self, only: &[String]) {
        if !only.is_empty() {
            self.recipes.retain(|recipe| only.contains(&recipe.name));
        }
    }
}

/// Every cookbook under `source`, sorted by path.
pub fn discover(source: &Path) -> Vec<PathBuf> {
    let mut found: Vec<_> = WalkDir::new(source)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.file_name()
                .to_str()
                .is_some_and(|name| name.ends_with(COOKBOOK_SUFFIX))
        })
        .map(|e| e.path())
        .collect();
    found.sort();
    found
}

/// Print warning about unknown fields.
fn print_unknown_fields_warning(fields: &[String], path: &Path) {
    let display_path = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_else(|| path.to_string_lossy());
    log!("warning"; "unknown fields in {}, ignoring:", display_path);
    for field in fields {
        eprintln!("- {}", field);
    }
}

// ============================================================================
// Resolution
// ============================================================================

fn palette(table: toml::Table) -> Result<Palette> {
    table
        .into_iter()
        .map(|(name, value)| match value {
            toml::Value::String(value) => Ok((name, value)),
            other => Err(ConfigError::validation(format!(
                "palette entry `{name}` must be a string, got {}",
                other.type_str()
            ))),
        })
        .collect()
}

fn resolve(
    name: &str,
    own: RecipeSection,
    defaults: &RecipeSection,
    cookbook: &CookbookSection,
) -> Result<Recipe> {
    let template = own
        .template
        .ok_or_else(|| ConfigError::validation(format!("recipe `{name}` has no template")))?;

    let sizes = match own.sizes.as_ref().or(defaults.sizes.as_ref()) {
        Some(sizes) => sizes
            .iter()
            .map(|size| {
                scalar(size).ok_or_else(|| {
                    ConfigError::validation(format!(
                        "size {size} of recipe `{name}` must be a string or a number"
                    ))
                })
            })
            .collect::<Result<_>>()?,
        None => Vec::new(),
    };

    let pick = |own: Option<String>, default: &Option<String>, fallback: &str| {
        own.or_else(|| default.clone())
            .unwrap_or_else(|| fallback.to_string())
    };

    let mut recipe = Recipe {
        name: name.to_string(),
        base: pick(own.base, &defaults.base, DEFAULT_BASE),
        template,
        sizes,
        context: pick(own.context, &defaults.context, DEFAULT_CONTEXT),
        folder: pick(own.folder, &defaults.folder, DEFAULT_FOLDER),
        aliases: own.aliases,
        css_suffixes: cookbook.remove_css_suffixes.clone(),
        ..Default::default()
    };

    let layers = [
        (&defaults.classes, &defaults.replace, &defaults.attrs),
        (&own.classes, &own.replace, &own.attrs),
    ];
    for (classes, replace, attrs) in layers {
        for (selector, value) in classes {
            recipe.class_edits.push(class_edit(name, selector, value)?);
        }
        for (selector, value) in replace {
            recipe.replacements.push(replacement(name, selector, value)?);
        }
        for (selector, value) in attrs {
            recipe.attribute_edits.push(attribute_edit(name, selector, value)?);
        }
    }

    recipe.remove = cookbook
        .remove
        .iter()
        .chain(&defaults.remove)
        .chain(&own.remove)
        .cloned()
        .collect();
    Ok(recipe)
}

fn class_edit(name: &str, selector: &str, value: &toml::Value) -> Result<ClassEdit> {
    let directive = value.as_str().ok_or_else(|| {
        ConfigError::validation(format!(
            "classes for `{selector}` in recipe `{name}` must be a string"
        ))
    })?;
    Ok(ClassEdit {
        selector: selector.to_string(),
        directive: ClassDirective::parse(directive),
    })
}

fn attribute_edit(name: &str, selector: &str, value: &toml::Value) -> Result<AttributeEdit> {
    let table = value.as_table().ok_or_else(|| {
        ConfigError::validation(format!(
            "attrs for `{selector}` in recipe `{name}` must be a table"
        ))
    })?;
    let attrs = table
        .iter()
        .map(|(attr, value)| match value.as_str() {
            Some(text) => Ok((attr.clone(), text.to_string())),
            None => Err(ConfigError::validation(format!(
                "attribute `{attr}` for `{selector}` in recipe `{name}` must be a string"
            ))),
        })
        .collect::<Result<_>>()?;
    Ok(AttributeEdit {
        selector: selector.to_string(),
        attrs,
    })
}

fn replacement(name: &str, selector: &str, value: &toml::Value) -> Result<Replacement> {
    let invalid = |what: &str| {
        ConfigError::validation(format!(
            "replacement for `{selector}` in recipe `{name}` {what}"
        ))
    };

    let (source, placement) = match value {
        toml::Value::String(source) => (source.clone(), None),
        toml::Value::Table(table) => {
            let source = table
                .get("source")
                .and_then(toml::Value::as_str)
                .ok_or_else(|| invalid("has no source"))?;
            let offset = |axis: &str| match table.get(axis) {
                None => Ok(DEFAULT_OFFSET.to_string()),
                Some(value) => scalar(value)
                    .ok_or_else(|| invalid(&format!("has a non-scalar `{axis}`"))),
            };
            let placement = Placement {
                x: offset("x")?,
                y: offset("y")?,
            };
            (source.to_string(), Some(placement))
        }
        _ => return Err(invalid("must be a path or a table")),
    };

    Ok(Replacement {
        selector: selector.to_string(),
        source,
        placement,
    })
}

/// Text of a string or number value.
fn scalar(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(text) => Some(text.clone()),
        toml::Value::Integer(n) => Some(n.to_string()),
        toml::Value::Float(n) => Some(n.to_string()),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const BREEZE: &str = r##"
[cookbook]
reserved-ids = ["current-color-scheme"]
remove-css-suffixes = ["-24"]
remove = ["#guides"]
precision = 2

[defaults]
sizes = ["16", 22]
context = "Actions"
folder = "actions"
base = "bases/square"
classes = { "#content" = "+ColorScheme-Text" }

[palette]
accent = "#3daee9"

[recipes.edit-copy]
template = "templates/edit-copy.svg"
aliases = ["gtk-copy"]
classes = { "#page" = "-old +new", "#badge" = "badge" }
attrs = { "#badge" = { fill = "@accent", stroke = "none" } }
replace = { "#badge" = "badges/plus.{size}.svg" }
remove = ["#shadow"]

[recipes.go-next]
template = "templates/arrow.svg"
sizes = ["32"]
folder = "places"
replace = { "#badge" = { source = "badges/arrow.svg", x = "right", y = 2 } }
"##;

    fn parse(text: &str) -> Result<Cookbook> {
        Cookbook::from_str(text, Path::new("themes/breeze.cookbook.toml"))
    }

    #[test]
    fn test_cookbook_settings() {
        let cookbook = parse(BREEZE).unwrap();
        assert_eq!(cookbook.name(), "breeze");
        assert_eq!(cookbook.dir, Path::new("themes"));
        assert_eq!(cookbook.palette.get("accent"), Some("#3daee9"));
        assert_eq!(cookbook.options.precision, 2);
        assert!(cookbook.options.reserved.contains("current-color-scheme"));
        assert_eq!(cookbook.loader().resolve("a.svg"), Path::new("themes/a.svg"));
    }

    #[test]
    fn test_recipes_keep_file_order() {
        let cookbook = parse(BREEZE).unwrap();
        let names: Vec<_> = cookbook.recipes.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["edit-copy", "go-next"]);
    }

    #[test]
    fn test_defaults_merge() {
        let cookbook = parse(BREEZE).unwrap();
        let copy = &cookbook.recipes[0];
        assert_eq!(copy.sizes, ["16", "22"]);
        assert_eq!((copy.context.as_str(), copy.folder.as_str()), ("Actions", "actions"));
        assert_eq!(copy.base_for("16"), "bases/square.16.svg");
        assert_eq!(copy.aliases, ["gtk-copy"]);
        assert_eq!(copy.remove, ["#guides", "#shadow"]);
        assert_eq!(copy.css_suffixes, ["-24"]);

        // defaults first, then the recipe's own in declaration order
        let selectors: Vec<_> = copy.class_edits.iter().map(|e| e.selector.as_str()).collect();
        assert_eq!(selectors, ["#content", "#page", "#badge"]);
        assert_eq!(copy.class_edits[1].directive, ClassDirective::parse("-old +new"));

        let next = &cookbook.recipes[1];
        assert_eq!(next.sizes, ["32"]);
        assert_eq!(next.folder, "places");
        assert_eq!(next.context, "Actions");
    }

    #[test]
    fn test_directive_shapes() {
        let cookbook = parse(BREEZE).unwrap();
        let copy = &cookbook.recipes[0];
        assert_eq!(
            copy.attribute_edits,
            vec![AttributeEdit {
                selector: "#badge".into(),
                attrs: vec![
                    ("fill".into(), "@accent".into()),
                    ("stroke".into(), "none".into()),
                ],
            }]
        );
        assert_eq!(copy.replacements[0].source, "badges/plus.{size}.svg");
        assert_eq!(copy.replacements[0].placement, None);

        let placement = cookbook.recipes[1].replacements[0].placement.clone();
        assert_eq!(
            placement,
            Some(Placement {
                x: "right".into(),
                y: "2".into(),
            })
        );
    }

    #[test]
    fn test_bare_fallbacks() {
        let cookbook = parse("[recipes.a]\ntemplate = \"a.svg\"\n").unwrap();
        let recipe = &cookbook.recipes[0];
        assert!(recipe.sizes.is_empty());
        assert_eq!(recipe.context, "Generic");
        assert_eq!(recipe.folder, "generic");
        assert_eq!(recipe.base, "undefined");
        assert_eq!(cookbook.options.precision, DEFAULT_PRECISION);
    }

    #[test]
    fn test_validation_errors() {
        let missing = parse("[recipes.a]\nsizes = [\"16\"]\n").unwrap_err();
        assert!(matches!(&missing, ConfigError::Validation(m) if m.contains("`a` has no template")));

        let not_string = parse(
            "[recipes.a]\ntemplate = \"a.svg\"\nattrs = { \"#x\" = { opacity = 0.5 } }\n",
        )
        .unwrap_err();
        assert!(
            matches!(&not_string, ConfigError::Validation(m) if m.contains("`opacity`")),
            "{not_string}"
        );

        let no_source = parse(
            "[recipes.a]\ntemplate = \"a.svg\"\nreplace = { \"#x\" = { x = \"left\" } }\n",
        )
        .unwrap_err();
        assert!(matches!(no_source, ConfigError::Validation(_)));

        assert!(matches!(parse("[recipes"), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_unknown_fields_collected() {
        let text = "[cookbook]\ncolour = 1\n[recipes.a]\ntemplate = \"a.svg\"\nalias = []\n";
        let (_, ignored) =
            Cookbook::parse_with_ignored(text, Path::new("x.cookbook.toml")).unwrap();
        assert_eq!(ignored, ["cookbook.colour", "recipes.a.alias"]);
    }

    #[test]
    fn test_load_and_discover() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("actions");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("b.cookbook.toml"), BREEZE).unwrap();
        fs::write(dir.path().join("a.cookbook.toml"), "").unwrap();
        fs::write(dir.path().join("notes.toml"), "").unwrap();

        let found = discover(dir.path());
        assert_eq!(
            found,
            vec![dir.path().join("a.cookbook.toml"), nested.join("b.cookbook.toml")]
        );

        let cookbook = Cookbook::load(&found[1]).unwrap();
        assert_eq!(cookbook.dir, nested);
        assert_eq!(cookbook.recipes.len(), 2);

        let missing = Cookbook::load(&dir.path().join("none.cookbook.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io(..)));
    }

    #[test]
    fn test_retain_recipes() {
        let mut cookbook = parse(BREEZE).unwrap();
        cookbook.retain_recipes(&[]);
        assert_eq!(cookbook.recipes.len(), 2);
        cookbook.retain_recipes(&["go-next".to_string()]);
        assert_eq!(cookbook.recipes.len(), 1);
        assert_eq!(cookbook.recipes[0].name, "go-next");
    }
}
