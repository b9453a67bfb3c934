/*!
 * Bilingual HTML and PDF output.
 *
 * The renderer lays out each section with the original and the translated
 * text side by side and writes `<out_dir>/<sanitized title>.html`. PDF output
 * shells out to wkhtmltopdf when it is installed.
 */

use std::path::{Path, PathBuf};

use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::TranslatedSection;
use crate::errors::AppError;

static FORBIDDEN: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[\\/?*|<>":;]+"#).unwrap());
static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Make a title usable as a file name: collapse whitespace, drop characters
/// that are unsafe in paths, bound the length.
pub fn sanitize_filename(title: &str) -> String {
    let name = FORBIDDEN.replace_all(title, "");
    let name = SPACES.replace_all(name.trim(), " ").into_owned();
    let name: String = name.chars().take(128).collect();
    if name.is_empty() { "untitled".to_string() } else { name }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Arrange the title and translated sections as a bilingual HTML page.
pub fn to_html(title: &str, sections: &[TranslatedSection]) -> String {
    let mut body = String::new();
    for ts in sections {
        if !ts.section.headline.is_empty() {
            body.push_str(&format!("    <h2>{}</h2>\n", escape(&ts.section.headline)));
        }
        body.push_str("    <div class=\"pair\">\n");
        body.push_str(&format!(
            "      <p class=\"original\">{}</p>\n",
            escape(&ts.section.body)
        ));
        body.push_str(&format!(
            "      <p class=\"translated\">{}</p>\n",
            escape(&ts.translated)
        ));
        body.push_str("    </div>\n");
    }
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <title>{title}</title>
    <style>
      body {{ font-family: sans-serif; margin: 2em auto; max-width: 60em; }}
      .pair {{ display: flex; gap: 1.5em; margin-bottom: 1em; }}
      .pair p {{ flex: 1; margin: 0; }}
      .original {{ color: #444; }}
    </style>
  </head>
  <body>
    <h1>{title}</h1>
{body}  </body>
</html>
"#,
        title = escape(title),
        body = body
    )
}

/// Write the bilingual page to `<out_dir>/<sanitized title>.html`.
pub fn write_html(
    out_dir: &Path,
    title: &str,
    sections: &[TranslatedSection],
) -> Result<PathBuf, AppError> {
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(format!("{}.html", sanitize_filename(title)));
    std::fs::write(&path, to_html(title, sections))?;
    info!("wrote {}", path.display());
    Ok(path)
}

/// Convert an HTML file to PDF with wkhtmltopdf. Requires the binary on PATH.
pub async fn html_to_pdf(html_path: &Path, delete_html: bool) -> Result<PathBuf, AppError> {
    let pdf_path = html_path.with_extension("pdf");
    let status = tokio::process::Command::new("wkhtmltopdf")
        .arg("--quiet")
        .arg("--enable-local-file-access")
        .arg(html_path)
        .arg(&pdf_path)
        .status()
        .await
        .map_err(|e| AppError::File(format!("could not run wkhtmltopdf: {}", e)))?;
    if !status.success() {
        return Err(AppError::File(format!(
            "wkhtmltopdf exited with {} for {}",
            status,
            html_path.display()
        )));
    }
    if delete_html {
        if let Err(e) = std::fs::remove_file(html_path) {
            warn!("could not remove {}: {}", html_path.display(), e);
        }
    }
    info!("wrote {}", pdf_path.display());
    Ok(pdf_path)
}
