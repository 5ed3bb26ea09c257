use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context as _};
use colored::Colorize;
use quire_core::{CoreConfig, GetAreaOptions, Quire};
use quire_store::{InMemoryStore, PageCollection, Snapshot};
use quire_types::sanitize::{slugify, SlugifyOptions};
use quire_types::{Area, Context, Page, Redirect, Version, VersionId};
use serde_json::Value;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let snapshot = Snapshot::load(&cli.data)
        .with_context(|| format!("reading {}", cli.data.display()))?;
    let store = Arc::new(InMemoryStore::from_snapshot(snapshot)?);
    let quire = Quire::builder(store.clone()).config(config).build();
    let ctx = cli.user.clone().map(Context::user).unwrap_or_default();
    let format = cli.format;
    let mutates = cli.command.mutates();

    match cli.command {
        Command::Resolve(args) => cmd_resolve(&quire, &ctx, &args.slug, format).await?,
        Command::GetPage(args) => cmd_get_page(&quire, &ctx, &args.slug, format).await?,
        Command::PutPage(args) => cmd_put_page(&quire, store.as_ref(), &ctx, args, format).await?,
        Command::GetArea(args) => cmd_get_area(&quire, &ctx, args, format).await?,
        Command::PutArea(args) => cmd_put_area(&quire, &ctx, args, format).await?,
        Command::History(args) => cmd_history(&quire, store.as_ref(), args, format).await?,
        Command::Rollback(args) => cmd_rollback(&quire, store.as_ref(), &ctx, args, format).await?,
        Command::Rename(args) => cmd_rename(&quire, &ctx, args, format).await?,
        Command::Redirect(args) => cmd_redirect(&quire, args, format).await?,
        Command::Slugify(args) => cmd_slugify(&args, format)?,
    }

    if mutates {
        store.to_snapshot()?.save(&cli.data)?;
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<CoreConfig> {
    let Some(path) = path else {
        return Ok(CoreConfig::default());
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn read_json(file: Option<&Path>) -> anyhow::Result<Value> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    serde_json::from_str(&text).context("input is not valid JSON")
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn cmd_resolve(quire: &Quire, ctx: &Context, slug: &str, format: OutputFormat) -> anyhow::Result<()> {
    let r = quire.get_page(ctx, slug).await?;
    if format == OutputFormat::Json {
        return print_json(&serde_json::json!({
            "best": r.best.as_ref().map(|p| &p.slug),
            "exact": r.is_exact,
            "remainder": r.remainder,
        }));
    }
    match &r.best {
        Some(page) if r.is_exact => println!("{} {}", "exact:".green().bold(), page.slug.bold()),
        Some(page) => println!(
            "{} {}  remainder: {}",
            "best:".yellow().bold(),
            page.slug.bold(),
            r.remainder.cyan()
        ),
        None => println!("No page matches {}.", slug.bold()),
    }
    Ok(())
}

async fn cmd_get_page(quire: &Quire, ctx: &Context, slug: &str, format: OutputFormat) -> anyhow::Result<()> {
    let r = quire.get_page(ctx, slug).await?;
    let Some(page) = r.best else {
        println!("No page matches {}.", slug.bold());
        return Ok(());
    };
    if format == OutputFormat::Json {
        return print_json(&page);
    }
    println!("{} ({})", page.slug.bold(), page.id.short_id().dimmed());
    if !r.remainder.is_empty() {
        println!("  remainder: {}", r.remainder.cyan());
    }
    println!("  title: {}", page.title().unwrap_or_default());
    for (name, area) in &page.areas {
        println!("  area {} ({} items)", name.yellow(), area.items.len());
    }
    Ok(())
}

async fn cmd_put_page(
    quire: &Quire,
    pages: &dyn PageCollection,
    ctx: &Context,
    args: PutArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let value = read_json(args.file.as_deref())?;
    let has_id = value.get("id").is_some();
    let mut page: Page = serde_json::from_value(value).context("input is not a page")?;
    // Without an explicit id, an existing page under the slug is updated.
    if !has_id {
        if let Some(existing) = pages.find_by_slug(&args.slug).await? {
            page.id = existing.id;
        }
    }
    for area in page.areas.values_mut() {
        quire.registry().sanitize_items(&mut area.items);
    }

    let stored = quire.put_page(ctx, &args.slug, page).await?;
    if format == OutputFormat::Json {
        return print_json(&stored);
    }
    println!("{} Stored page {} ({})", "✓".green().bold(), stored.slug.bold(), stored.id.short_id().dimmed());
    if stored.slug != args.slug {
        println!("  slug adjusted from {}", args.slug.yellow());
    }
    Ok(())
}

async fn cmd_get_area(quire: &Quire, ctx: &Context, args: GetAreaArgs, format: OutputFormat) -> anyhow::Result<()> {
    let options = GetAreaOptions { load: !args.no_load };
    let Some(area) = quire.get_area(ctx, &args.slug, options).await? else {
        println!("No area at {}.", args.slug.bold());
        return Ok(());
    };
    if format == OutputFormat::Json {
        return print_json(&area);
    }
    println!("{} ({} items)", args.slug.bold(), area.items.len());
    for item in &area.items {
        let rendered = quire.registry().render(item);
        println!("  {} {}", item.item_type.yellow(), rendered.unwrap_or_default().dimmed());
    }
    Ok(())
}

async fn cmd_put_area(quire: &Quire, ctx: &Context, args: PutArgs, format: OutputFormat) -> anyhow::Result<()> {
    let mut area: Area = serde_json::from_value(read_json(args.file.as_deref())?).context("input is not an area")?;
    quire.registry().sanitize_items(&mut area.items);

    let stored = quire.put_area(ctx, &args.slug, area).await?;
    if format == OutputFormat::Json {
        return print_json(&stored);
    }
    println!("{} Stored area {} ({} items)", "✓".green().bold(), args.slug.bold(), stored.items.len());
    Ok(())
}

async fn find_page(pages: &dyn PageCollection, slug: &str) -> anyhow::Result<Page> {
    match pages.find_by_slug(slug).await? {
        Some(page) => Ok(page),
        None => bail!("no page with slug {slug}"),
    }
}

async fn cmd_history(quire: &Quire, pages: &dyn PageCollection, args: HistoryArgs, format: OutputFormat) -> anyhow::Result<()> {
    let page = find_page(pages, &args.slug).await?;
    let versions = quire.history(&page.id, Some(args.limit)).await?;
    if format == OutputFormat::Json {
        return print_json(&versions);
    }
    if versions.is_empty() {
        println!("No versions of {}.", page.slug.bold());
    }
    for version in &versions {
        print_version(version);
    }
    Ok(())
}

fn print_version(version: &Version) {
    println!(
        "{}  {}  {}",
        version.id.to_string().yellow().bold(),
        version.created_at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
        version.author.cyan()
    );
    for segment in &version.diff {
        for line in segment.text.lines() {
            if segment.is_added() {
                println!("  {}", format!("+ {line}").green());
            } else {
                println!("  {}", format!("- {line}").red());
            }
        }
    }
}

async fn cmd_rollback(
    quire: &Quire,
    pages: &dyn PageCollection,
    ctx: &Context,
    args: RollbackArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let page = find_page(pages, &args.slug).await?;
    let id: VersionId = args.version.parse()?;
    let Some(version) = quire.version(&id).await? else {
        bail!("no version {id}");
    };
    if version.page_id != page.id {
        bail!("version {id} belongs to another page");
    }

    let restored = quire.roll_back_page(ctx, page, &version).await?;
    if format == OutputFormat::Json {
        return print_json(&restored);
    }
    println!(
        "{} Rolled back {} to {}",
        "✓".green().bold(),
        restored.slug.bold(),
        id.short_id().yellow()
    );
    Ok(())
}

async fn cmd_rename(quire: &Quire, ctx: &Context, args: RenameArgs, format: OutputFormat) -> anyhow::Result<()> {
    let Some(page) = quire.rename_page(ctx, &args.from, &args.to).await? else {
        bail!("no page with slug {}", args.from);
    };
    if format == OutputFormat::Json {
        return print_json(&page);
    }
    println!("{} Renamed {} → {}", "✓".green().bold(), args.from.yellow(), page.slug.bold());
    Ok(())
}

async fn cmd_redirect(quire: &Quire, args: RedirectArgs, format: OutputFormat) -> anyhow::Result<()> {
    let redirects: Vec<Redirect> = match &args.from {
        Some(from) => quire.lookup_redirect(from).await?.into_iter().collect(),
        None => quire.redirects().list().await?,
    };
    if format == OutputFormat::Json {
        return print_json(&redirects);
    }
    if redirects.is_empty() {
        println!("No redirects.");
    }
    for redirect in &redirects {
        println!("{} → {}", redirect.from.yellow(), redirect.to.bold());
    }
    Ok(())
}

fn cmd_slugify(args: &SlugifyArgs, format: OutputFormat) -> anyhow::Result<()> {
    let options = SlugifyOptions {
        allow: args.allow.clone(),
        separator: args.separator,
    };
    let slug = slugify(&args.text, &options);
    if format == OutputFormat::Json {
        return print_json(&slug);
    }
    println!("{slug}");
    Ok(())
}
