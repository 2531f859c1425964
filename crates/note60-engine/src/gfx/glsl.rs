//! Minimal GLSL ES 1.00 front-end for the recording backend.
//!
//! Not a compiler. It checks the structure real drivers reject most often
//! (unbalanced braces/parentheses, missing `main`, malformed global
//! declarations, stage-invalid qualifiers) and extracts the global
//! `attribute`, `uniform` and `varying` names so locations can be resolved.
//! Diagnostics follow the common `ERROR: 0:<line>: ...` driver format.

use super::ShaderStage;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Declarations {
    pub attributes: Vec<String>,
    pub uniforms: Vec<String>,
    pub varyings: Vec<String>,
}

const TYPES: &[&str] = &[
    "float", "int", "bool", "vec2", "vec3", "vec4", "ivec2", "ivec3", "ivec4", "bvec2", "bvec3",
    "bvec4", "mat2", "mat3", "mat4", "sampler2D", "samplerCube",
];

const PRECISIONS: &[&str] = &["lowp", "mediump", "highp"];

pub(crate) fn check(stage: ShaderStage, source: &str) -> Result<Declarations, String> {
    let stripped = strip_comments(source);

    let mut decls = Declarations::default();
    let mut has_main = false;

    let mut brace_depth = 0usize;
    let mut paren_depth = 0usize;
    let mut line = 1usize;
    let mut stmt = String::new();
    let mut stmt_line = 1usize;

    // Preprocessor lines are skipped whole; conditionals are not evaluated.
    let mut directive = false;
    let mut line_start = true;
    let mut prev = '\0';

    for ch in stripped.chars() {
        if directive {
            // A trailing backslash continues the directive onto the next line.
            if ch != '\n' || prev == '\\' {
                if ch == '\n' {
                    line += 1;
                }
                prev = ch;
                continue;
            }
            directive = false;
        } else if ch == '#' && line_start {
            directive = true;
            prev = ch;
            continue;
        }
        prev = ch;
        line_start = ch == '\n' || (line_start && ch.is_whitespace());

        match ch {
            '\n' => {
                line += 1;
                if brace_depth == 0 {
                    stmt.push(' ');
                }
                continue;
            }
            '(' => paren_depth += 1,
            ')' => {
                if paren_depth == 0 {
                    return Err(diag(line, "')'", "syntax error"));
                }
                paren_depth -= 1;
            }
            '{' => {
                if brace_depth == 0 {
                    if is_main_header(&stmt) {
                        has_main = true;
                    }
                    stmt.clear();
                }
                brace_depth += 1;
                continue;
            }
            '}' => {
                if brace_depth == 0 {
                    return Err(diag(line, "'}'", "syntax error"));
                }
                brace_depth -= 1;
                continue;
            }
            ';' if brace_depth == 0 => {
                global_statement(stage, &stmt, stmt_line, &mut decls)?;
                stmt.clear();
                continue;
            }
            _ => {}
        }

        if brace_depth == 0 {
            if stmt.trim().is_empty() && !ch.is_whitespace() {
                stmt_line = line;
            }
            stmt.push(ch);
        }
    }

    if brace_depth != 0 || paren_depth != 0 {
        return Err(diag(line, "", "unexpected end of file"));
    }
    if !stmt.trim().is_empty() {
        return Err(diag(stmt_line, &format!("'{}'", stmt.trim()), "syntax error"));
    }
    if !has_main {
        return Err(diag(line, "'main'", "function not defined"));
    }

    Ok(decls)
}

/// Link-time check: every varying the fragment stage reads must be written
/// by the vertex stage.
pub(crate) fn link(vertex: &Declarations, fragment: &Declarations) -> Result<(), String> {
    for v in &fragment.varyings {
        if !vertex.varyings.contains(v) {
            return Err(format!(
                "ERROR: Varying `{v}` is read by the fragment shader but not declared in the vertex shader"
            ));
        }
    }
    Ok(())
}

fn global_statement(
    stage: ShaderStage,
    stmt: &str,
    line: usize,
    decls: &mut Declarations,
) -> Result<(), String> {
    // `u_Colors [2]` and `u_Colors[2]` declare the same array.
    let mut stmt = stmt.to_string();
    while stmt.contains(" [") {
        stmt = stmt.replace(" [", "[");
    }

    let tokens: Vec<&str> = stmt
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .collect();

    let Some((&qualifier, rest)) = tokens.split_first() else {
        return Ok(());
    };

    let target = match qualifier {
        "attribute" => {
            if stage != ShaderStage::Vertex {
                return Err(diag(line, "'attribute'", "supported in vertex shaders only"));
            }
            &mut decls.attributes
        }
        "uniform" => &mut decls.uniforms,
        "varying" => &mut decls.varyings,
        "precision" => {
            return match rest {
                [p, "float" | "int"] if PRECISIONS.contains(p) => Ok(()),
                _ => Err(diag(line, "'precision'", "syntax error")),
            };
        }
        // Other globals (consts, plain variables) are accepted unchecked.
        _ => return Ok(()),
    };

    let rest = match rest.split_first() {
        Some((p, tail)) if PRECISIONS.contains(p) => tail,
        _ => rest,
    };

    let Some((&ty, names)) = rest.split_first() else {
        return Err(diag(line, &format!("'{qualifier}'"), "syntax error"));
    };
    if !TYPES.contains(&ty) {
        return Err(diag(line, &format!("'{ty}'"), "unknown type"));
    }
    if names.is_empty() {
        return Err(diag(line, &format!("'{ty}'"), "declaration requires a name"));
    }

    for token in names {
        let Some(name) = declared_name(token) else {
            return Err(diag(line, &format!("'{token}'"), "syntax error"));
        };
        if target.iter().any(|n| n == name) {
            return Err(diag(line, &format!("'{name}'"), "redefinition"));
        }
        target.push(name.to_string());
    }
    Ok(())
}

fn is_main_header(stmt: &str) -> bool {
    let compact: String = stmt.split_whitespace().collect::<Vec<_>>().join(" ");
    compact.starts_with("void main (") || compact.starts_with("void main(")
}

/// Name declared by `token`: a plain identifier or `name[N]` with N > 0.
fn declared_name(token: &str) -> Option<&str> {
    let (base, size) = match token.split_once('[') {
        Some((base, rest)) => (base, Some(rest.strip_suffix(']')?)),
        None => (token, None),
    };
    let size_ok = size.is_none_or(|n| n.parse::<u32>().is_ok_and(|n| n > 0));
    (is_identifier(base) && size_ok).then_some(base)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Removes `//` and `/* */` comments, keeping newlines so line numbers hold.
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        let next = chars.peek().copied();
        match (c, next) {
            ('/', Some('/')) => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                    }
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            _ => out.push(c),
        }
    }
    out
}

fn diag(line: usize, token: &str, message: &str) -> String {
    if token.is_empty() {
        format!("ERROR: 0:{line}: {message}")
    } else {
        format!("ERROR: 0:{line}: {token} : {message}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = "
uniform mat4 u_MVP;
uniform vec3 u_LightPos;
attribute vec4 a_Position;
attribute vec3 a_Normal;
varying vec4 v_Color;

void main() {
    v_Color = vec4(1.0);
    gl_Position = u_MVP * a_Position;
}
";

    #[test]
    fn collects_declarations() {
        let d = check(ShaderStage::Vertex, VS).unwrap();
        assert_eq!(d.uniforms, vec!["u_MVP", "u_LightPos"]);
        assert_eq!(d.attributes, vec!["a_Position", "a_Normal"]);
        assert_eq!(d.varyings, vec!["v_Color"]);
    }

    #[test]
    fn precision_and_comments_are_accepted() {
        let src = "precision mediump float; // default\n/* block\n comment */\nvarying vec4 v_Color;\nvoid main() { gl_FragColor = v_Color; }\n";
        let d = check(ShaderStage::Fragment, src).unwrap();
        assert_eq!(d.varyings, vec!["v_Color"]);
    }

    #[test]
    fn comma_separated_names() {
        let src = "uniform highp mat4 u_A, u_B;\nvoid main() {}\n";
        let d = check(ShaderStage::Vertex, src).unwrap();
        assert_eq!(d.uniforms, vec!["u_A", "u_B"]);
    }

    #[test]
    fn unbalanced_brace_reports_eof() {
        let err = check(ShaderStage::Vertex, "void main() {\n").unwrap_err();
        assert!(err.contains("unexpected end of file"), "{err}");
    }

    #[test]
    fn stray_closing_brace_reports_line() {
        let err = check(ShaderStage::Vertex, "void main() {}\n}\n").unwrap_err();
        assert_eq!(err, "ERROR: 0:2: '}' : syntax error");
    }

    #[test]
    fn missing_main_is_rejected() {
        let err = check(ShaderStage::Fragment, "varying vec4 v;\nvoid helper() {}\n").unwrap_err();
        assert!(err.contains("'main'"), "{err}");
    }

    #[test]
    fn attribute_in_fragment_is_rejected() {
        let err = check(ShaderStage::Fragment, "attribute vec4 a;\nvoid main() {}\n").unwrap_err();
        assert!(err.contains("vertex shaders only"), "{err}");
    }

    #[test]
    fn unknown_type_reports_its_line() {
        let err = check(ShaderStage::Vertex, "\n\nuniform vec5 u_Bad;\nvoid main() {}\n").unwrap_err();
        assert_eq!(err, "ERROR: 0:3: 'vec5' : unknown type");
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        let err = check(ShaderStage::Vertex, "void main() {}\nuniform mat4").unwrap_err();
        assert!(err.contains("syntax error"), "{err}");
    }

    #[test]
    fn version_directive_keeps_following_declarations() {
        let src = "#version 100\nuniform mat4 u_MVP;\nattribute vec4 a_Position;\nvoid main() { gl_Position = u_MVP * a_Position; }\n";
        let d = check(ShaderStage::Vertex, src).unwrap();
        assert_eq!(d.uniforms, vec!["u_MVP"]);
        assert_eq!(d.attributes, vec!["a_Position"]);
    }

    #[test]
    fn precision_guard_is_skipped_and_lines_still_count() {
        let src = "#ifdef GL_ES\nprecision mediump float;\n#endif\n#define TINT(c) (c * 0.5)\nvarying vec4 v_Color;\nuniform vec5 u_Bad;\nvoid main() { gl_FragColor = TINT(v_Color); }\n";
        let err = check(ShaderStage::Fragment, src).unwrap_err();
        assert_eq!(err, "ERROR: 0:6: 'vec5' : unknown type");

        let ok = src.replace("uniform vec5 u_Bad;", "");
        let d = check(ShaderStage::Fragment, &ok).unwrap();
        assert_eq!(d.varyings, vec!["v_Color"]);
    }

    #[test]
    fn continued_directive_spans_lines() {
        let src = "#define SCALE(x) \\\n  ((x) * 2.0)\nuniform float u_K;\nvoid main() {}\n";
        let d = check(ShaderStage::Vertex, src).unwrap();
        assert_eq!(d.uniforms, vec!["u_K"]);
    }

    #[test]
    fn array_declarations_use_the_base_name() {
        let src = "uniform vec4 u_Colors[2];\nuniform lowp float u_W [4], u_S;\nvoid main() {}\n";
        let d = check(ShaderStage::Vertex, src).unwrap();
        assert_eq!(d.uniforms, vec!["u_Colors", "u_W", "u_S"]);

        let err = check(ShaderStage::Vertex, "uniform vec4 u_Bad[];\nvoid main() {}\n").unwrap_err();
        assert!(err.contains("syntax error"), "{err}");
    }

    #[test]
    fn link_requires_matching_varyings() {
        let vs = check(ShaderStage::Vertex, VS).unwrap();
        let fs = check(
            ShaderStage::Fragment,
            "varying vec3 v_Grid;\nvoid main() {}\n",
        )
        .unwrap();
        let err = link(&vs, &fs).unwrap_err();
        assert!(err.contains("v_Grid"), "{err}");
    }
}
