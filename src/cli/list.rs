//! Recipe listing.

use crate::{
    cli::{CookbookArgs, common::load_cookbooks},
    log,
    recipe::Recipe,
    utils::plural_count,
};
use anyhow::Result;
use owo_colors::OwoColorize;

/// Print every recipe of the selected cookbooks.
pub fn list_recipes(args: &CookbookArgs) -> Result<()> {
    for cookbook in load_cookbooks(args)? {
        log!(&cookbook.name(); "{}", plural_count(cookbook.recipes.len(), "recipe"));
        for recipe in &cookbook.recipes {
            println!("  {}", describe(recipe));
        }
    }
    Ok(())
}

/// `name [sizes] folder` plus aliases when there are any.
fn describe(recipe: &Recipe) -> String {
    let mut line = format!(
        "{} [{}] {}",
        recipe.name.bold(),
        recipe.sizes.join(", "),
        recipe.folder.dimmed()
    );
    if !recipe.aliases.is_empty() {
        line.push_str(&format!(" -> {}", recipe.aliases.join(", ")));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_recipe() {
        let mut recipe = Recipe {
            name: "edit-copy".into(),
            sizes: vec!["16".into(), "22".into()],
            folder: "actions".into(),
            ..Default::default()
        };
        let line = describe(&recipe);
        assert!(line.contains("[16, 22]"), "{line}");
        assert!(!line.contains("->"), "{line}");

        recipe.aliases = vec!["gtk-copy".into(), "copy".into()];
        assert!(describe(&recipe).ends_with(" -> gtk-copy, copy"));
    }
}
