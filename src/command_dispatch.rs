//! Purpose: Map parsed CLI commands onto catalog operations and emit output.
//! Role: The only bridge between arg parsing in `main` and the library surface.
//! Invariants: `--remote` routes reads and writes through a server, never both stores.
//! Invariants: Human output goes to stdout; startup guidance and errors to stderr.

use super::*;

use swatchbook::api::{Catalog, ListParams, POPULAR_TAG_LIMIT, PaletteDraft, RemoteCatalog};
use swatchbook::paths::store_file;

pub fn dispatch_command(
    command: Command,
    data_dir: PathBuf,
    color_mode: ColorMode,
) -> Result<RunOutcome, Error> {
    match command {
        Command::Add {
            colors,
            tag,
            json,
            remote,
        } => run_add(&data_dir, colors, tag, json, remote, color_mode),
        Command::List {
            page,
            limit,
            tag,
            search,
            json,
            remote,
        } => run_list(&data_dir, page, limit, tag, search, json, remote, color_mode),
        Command::Tags {
            popular,
            limit,
            json,
            remote,
        } => run_tags(&data_dir, popular, limit, json, remote, color_mode),
        Command::Seed {
            count,
            scheme,
            json,
        } => run_seed(&data_dir, count, scheme, json, color_mode),
        Command::Info { json } => run_info(&data_dir, json, color_mode),
        Command::Serve {
            bind,
            cors_origin,
            max_body_bytes,
        } => run_serve(data_dir, bind, cors_origin, max_body_bytes),
        Command::Version { json } => {
            emit_version_output(color_mode, json);
            Ok(RunOutcome::ok())
        }
        Command::Completion { shell } => {
            clap_complete::aot::generate(
                shell,
                &mut Cli::command(),
                "swatchbook",
                &mut io::stdout(),
            );
            Ok(RunOutcome::ok())
        }
    }
}

fn local_catalog(data_dir: &Path) -> Catalog {
    Catalog::open(store_file(data_dir))
}

fn use_color(color_mode: ColorMode) -> bool {
    color_mode.use_color(io::stdout().is_terminal())
}

fn to_json_value<T: serde::Serialize>(value: &T) -> Result<Value, Error> {
    serde_json::to_value(value).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to encode output as JSON")
            .with_source(err)
    })
}

fn run_add(
    data_dir: &Path,
    colors: Vec<String>,
    tags: Vec<String>,
    json: bool,
    remote: Option<String>,
    color_mode: ColorMode,
) -> Result<RunOutcome, Error> {
    let draft = PaletteDraft::new(colors, tags);

    let palette = match remote {
        Some(url) => RemoteCatalog::new(url)?.create(&draft)?,
        None => local_catalog(data_dir).add(&draft)?,
    };

    if json {
        emit_json(to_json_value(&palette)?, color_mode);
    } else {
        println!("{}", swatch::palette_row(&palette, use_color(color_mode)));
    }
    Ok(RunOutcome::ok())
}

#[allow(clippy::too_many_arguments)]
fn run_list(
    data_dir: &Path,
    page: Option<u64>,
    limit: Option<u64>,
    tags: Vec<String>,
    search: Option<String>,
    json: bool,
    remote: Option<String>,
    color_mode: ColorMode,
) -> Result<RunOutcome, Error> {
    let mut params = ListParams::new();
    if let Some(page) = page {
        params = params.with_page(page);
    }
    if let Some(limit) = limit {
        params = params.with_limit(limit);
    }
    if !tags.is_empty() {
        params = params.with_tags(tags.join(","));
    }
    if let Some(search) = search {
        params = params.with_search(search);
    }

    let page = match remote {
        Some(url) => RemoteCatalog::new(url)?.list(&params)?,
        None => local_catalog(data_dir).list(&params)?,
    };

    if json {
        emit_json(to_json_value(&page)?, color_mode);
        return Ok(RunOutcome::ok());
    }

    if page.results.is_empty() {
        println!("No palettes found.");
    } else {
        println!("{}", swatch::palette_rows(&page.results, use_color(color_mode)));
    }

    let p = &page.pagination;
    println!(
        "page {} of {} ({} palette{})",
        p.page,
        p.pages,
        p.total,
        if p.total == 1 { "" } else { "s" }
    );
    if p.has_more {
        println!("next: --page {}", p.page + 1);
    }
    Ok(RunOutcome::ok())
}

fn run_tags(
    data_dir: &Path,
    popular: bool,
    limit: Option<usize>,
    json: bool,
    remote: Option<String>,
    color_mode: ColorMode,
) -> Result<RunOutcome, Error> {
    if popular {
        let limit = limit.unwrap_or(POPULAR_TAG_LIMIT);
        let ranking = match remote {
            Some(url) => RemoteCatalog::new(url)?.popular_tags(limit)?,
            None => local_catalog(data_dir).popular_tags(limit)?,
        };
        if json {
            emit_json(to_json_value(&ranking)?, color_mode);
        } else if ranking.is_empty() {
            println!("No tags yet.");
        } else {
            for entry in &ranking {
                println!("{:>5}  {}", entry.count, entry.tag);
            }
        }
        return Ok(RunOutcome::ok());
    }

    let tags = match remote {
        Some(url) => RemoteCatalog::new(url)?.distinct_tags()?,
        None => local_catalog(data_dir).distinct_tags()?,
    };
    if json {
        emit_json(to_json_value(&tags)?, color_mode);
    } else if tags.is_empty() {
        println!("No tags yet.");
    } else {
        for tag in &tags {
            println!("{tag}");
        }
    }
    Ok(RunOutcome::ok())
}

fn run_seed(
    data_dir: &Path,
    count: usize,
    scheme: Option<seed::Scheme>,
    json: bool,
    color_mode: ColorMode,
) -> Result<RunOutcome, Error> {
    let catalog = local_catalog(data_dir);
    let created = seed::seed(&catalog, count, scheme)?;

    if json {
        emit_json(to_json_value(&created)?, color_mode);
    } else {
        if !created.is_empty() {
            println!("{}", swatch::palette_rows(&created, use_color(color_mode)));
        }
        println!(
            "Seeded {} palette{} into {}",
            created.len(),
            if created.len() == 1 { "" } else { "s" },
            catalog.store_path().display()
        );
    }
    Ok(RunOutcome::ok())
}

fn run_info(data_dir: &Path, json: bool, color_mode: ColorMode) -> Result<RunOutcome, Error> {
    let catalog = local_catalog(data_dir);
    let page = catalog.list(&ListParams::new().with_limit(1))?;
    let tags = catalog.distinct_tags()?;

    if json {
        emit_json(
            json!({
                "path": catalog.store_path().display().to_string(),
                "palettes": page.pagination.total,
                "tags": tags.len(),
            }),
            color_mode,
        );
    } else {
        println!("store:    {}", catalog.store_path().display());
        println!("palettes: {}", page.pagination.total);
        println!("tags:     {}", tags.len());
    }
    Ok(RunOutcome::ok())
}

fn run_serve(
    data_dir: PathBuf,
    bind: String,
    cors_allowed_origins: Vec<String>,
    max_body_bytes: u64,
) -> Result<RunOutcome, Error> {
    let bind = bind.parse().map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message(format!("invalid --bind address: {bind}"))
            .with_hint("Use host:port, e.g. 127.0.0.1:5003.")
            .with_source(err)
    })?;

    let store = store_file(&data_dir);
    let config = serve::ServeConfig {
        bind,
        data_dir,
        cors_allowed_origins,
        max_body_bytes,
    };
    serve::validate_config(&config)?;
    emit_serve_startup_guidance(&config, &store);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("failed to start async runtime")
                .with_source(err)
        })?;
    runtime.block_on(serve::serve(config))?;
    Ok(RunOutcome::ok())
}
