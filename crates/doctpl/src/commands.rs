//! Subcommand implementations.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use doctpl_convert::{PdfConverter, Thumbnailer};
use doctpl_render::{check, Context};

use crate::cli::{
    CheckArgs, Commands, DraftArgs, PrepareArgs, PreviewArgs, RenderArgs, TagsArgs, ThumbnailArgs,
};
use crate::config::DoctplConfig;
use crate::schema::{load_data, Schema};

pub fn dispatch(command: Commands, config: &DoctplConfig) -> Result<()> {
    match command {
        Commands::Render(args) => render(args, config),
        Commands::Draft(args) => draft(args, config),
        Commands::Preview(args) => preview(args, config),
        Commands::Check(args) => check_consistency(args),
        Commands::Tags(args) => tags(args, config),
        Commands::Prepare(args) => prepare(args, config),
        Commands::Thumbnail(args) => thumbnail(args, config),
    }
}

fn render(args: RenderArgs, config: &DoctplConfig) -> Result<()> {
    let template = read_template(&args.template)?;
    let context: Context = load_data(&args.context)?;
    let docx = config
        .engine()?
        .open(&template)?
        .render(&context)?
        .into_inner();
    let bytes = to_pdf_if(args.pdf, docx, config)?;
    write_output(&args.output, &bytes)
}

fn draft(args: DraftArgs, config: &DoctplConfig) -> Result<()> {
    let template = read_template(&args.template)?;
    let schema = Schema::load(&args.schema)?;
    let docx = config
        .engine()?
        .open(&template)?
        .draft(&schema.labels())?
        .into_inner();
    let bytes = to_pdf_if(args.pdf, docx, config)?;
    let output = args.output.unwrap_or_else(|| {
        beside(&args.template, schema.draft_file_name(extension(args.pdf)))
    });
    write_output(&output, &bytes)
}

fn preview(args: PreviewArgs, config: &DoctplConfig) -> Result<()> {
    let template = read_template(&args.template)?;
    let schema = Schema::load(&args.schema)?;
    let context = match &args.context {
        Some(path) => load_data::<Context>(path)?.without_empty(),
        None => Context::new(),
    };
    let docx = config
        .engine()?
        .open(&template)?
        .partial(&context, &schema.defaults())?
        .into_inner();
    let bytes = to_pdf_if(args.pdf, docx, config)?;
    let output = args.output.unwrap_or_else(|| {
        beside(&args.template, schema.preview_file_name(extension(args.pdf)))
    });
    write_output(&output, &bytes)
}

fn check_consistency(args: CheckArgs) -> Result<()> {
    let schema = Schema::load(&args.schema)?;
    let template = match fs::read(&args.template) {
        Ok(bytes) => Some(bytes),
        Err(err) => {
            log::warn!("cannot read template {}: {err}", args.template.display());
            None
        }
    };
    let diff = check(template.as_deref(), &schema.field_tags());
    println!("{}", serde_json::to_string_pretty(&diff.report())?);
    if args.strict && !diff.is_consistent() {
        bail!("{} does not match {}", args.template.display(), args.schema.display());
    }
    Ok(())
}

fn tags(args: TagsArgs, config: &DoctplConfig) -> Result<()> {
    let template = read_template(&args.template)?;
    for tag in config.engine()?.open(&template)?.tags()? {
        println!("{tag}");
    }
    Ok(())
}

fn prepare(args: PrepareArgs, config: &DoctplConfig) -> Result<()> {
    let template = read_template(&args.template)?;
    let bytes = config.engine()?.open(&template)?.prepare()?.into_inner();
    let output = args.output.as_deref().unwrap_or(args.template.as_path());
    write_output(output, &bytes)
}

fn thumbnail(args: ThumbnailArgs, config: &DoctplConfig) -> Result<()> {
    let template = read_template(&args.template)?;
    let schema = Schema::load(&args.schema)?;
    let docx = config
        .engine()?
        .open(&template)?
        .draft(&schema.labels())?
        .into_inner();
    let pdf = to_pdf_if(true, docx, config)?;
    let width = args.width.unwrap_or(config.thumbnail.width);
    let height = args.height.unwrap_or(config.thumbnail.height);
    let png = config
        .thumbnailer()?
        .thumbnail(&pdf, width, height)
        .context("thumbnail generation failed")?;
    write_output(&args.output, &png)
}

fn read_template(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("cannot read template {}", path.display()))
}

fn to_pdf_if(pdf: bool, docx: Vec<u8>, config: &DoctplConfig) -> Result<Vec<u8>> {
    if !pdf {
        return Ok(docx);
    }
    config
        .office_converter()?
        .convert(&docx)
        .context("PDF conversion failed")
}

fn extension(pdf: bool) -> &'static str {
    if pdf {
        "pdf"
    } else {
        "docx"
    }
}

fn beside(template: &Path, name: String) -> PathBuf {
    template.with_file_name(name)
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).with_context(|| format!("cannot write {}", path.display()))?;
    log::info!("wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_outputs_sit_beside_the_template() {
        let path = beside(Path::new("/work/templates/t.docx"), "Акт_шаблон.pdf".into());
        assert_eq!(path, Path::new("/work/templates/Акт_шаблон.pdf"));
        assert_eq!(extension(false), "docx");
    }
}
