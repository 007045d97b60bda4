use wgpu::naga;

use crate::error::{CompileDiagnostic, ShaderStage};

/// Front-end-validated GLSL for one pipeline stage.
///
/// Compilation happens entirely on the CPU via naga, so a rejected shader
/// produces a [`CompileDiagnostic`] before any GPU object exists; linking
/// hands the same text to `wgpu` afterwards.
#[derive(Debug)]
pub(crate) struct CompiledStage {
    pub stage: ShaderStage,
    pub glsl: String,
    pub uniforms: UniformUsage,
}

/// Which of the well-known uniforms the user source actually references.
///
/// A fragment shader need not declare `time` or `resolution`; an absent
/// uniform is skipped silently at upload time, never treated as an error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UniformUsage {
    pub time: bool,
    pub resolution: bool,
    pub frag_coord: bool,
}

impl UniformUsage {
    pub(crate) fn scan(source: &str) -> Self {
        Self {
            time: contains_word(source, "time"),
            resolution: contains_word(source, "resolution"),
            frag_coord: contains_word(source, "gl_FragCoord"),
        }
    }

    pub fn any(&self) -> bool {
        self.time || self.resolution
    }

    /// True when the per-frame block must be uploaded: the shader reads a
    /// well-known uniform directly, or reads `gl_FragCoord`, whose
    /// bottom-left remap goes through the stored resolution.
    pub fn needs_upload(&self) -> bool {
        self.time || self.resolution || self.frag_coord
    }
}

/// Compiles the fixed full-screen quad vertex shader.
///
/// This stage is built in and never supplied by callers; a failure here
/// indicates a host problem and is treated as fatal by the lifecycle manager.
pub(crate) fn compile_vertex_stage() -> Result<CompiledStage, CompileDiagnostic> {
    validate_glsl(ShaderStage::Vertex, VERTEX_SHADER_GLSL)?;
    Ok(CompiledStage {
        stage: ShaderStage::Vertex,
        glsl: VERTEX_SHADER_GLSL.to_string(),
        uniforms: UniformUsage::default(),
    })
}

/// Wraps untrusted WebGL-dialect fragment source and compiles it.
///
/// Caller-supplied shaders fail routinely; this path is recoverable by
/// design.
pub(crate) fn compile_fragment_stage(source: &str) -> Result<CompiledStage, CompileDiagnostic> {
    let uniforms = UniformUsage::scan(source);
    let wrapped = wrap_webgl_fragment(source);
    validate_glsl(ShaderStage::Fragment, &wrapped)?;
    Ok(CompiledStage {
        stage: ShaderStage::Fragment,
        glsl: wrapped,
        uniforms,
    })
}

fn validate_glsl(stage: ShaderStage, glsl: &str) -> Result<(), CompileDiagnostic> {
    let naga_stage = match stage {
        ShaderStage::Vertex => naga::ShaderStage::Vertex,
        ShaderStage::Fragment | ShaderStage::Link => naga::ShaderStage::Fragment,
    };

    let mut frontend = naga::front::glsl::Frontend::default();
    let options = naga::front::glsl::Options::from(naga_stage);
    let module = frontend
        .parse(&options, glsl)
        .map_err(|errors| CompileDiagnostic::new(stage, errors.to_string()))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .map_err(|error| CompileDiagnostic::new(stage, error.into_inner().to_string()))?;

    Ok(())
}

/// Produces a self-contained GLSL 450 fragment shader from WebGL-style code.
///
/// Steps performed:
///
/// 1. Strip `#version`/`precision` directives and the `time`/`resolution`
///    uniform declarations so we can inject our own definitions.
/// 2. Prepend [`FRAGMENT_HEADER`], which declares the frame uniform block,
///    the color output, and macro aliases for the WebGL names.
/// 3. Append [`FRAGMENT_FOOTER`], which remaps `gl_FragCoord` to the
///    bottom-left origin the shaders were authored against and delegates to
///    the renamed user entry point.
fn wrap_webgl_fragment(source: &str) -> String {
    let mut sanitized = String::new();
    for line in source.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("#version") {
            continue;
        }
        if trimmed.starts_with("precision ") {
            continue;
        }
        let replaced_uniform = trimmed.starts_with("uniform ")
            && (contains_word(trimmed, "time") || contains_word(trimmed, "resolution"));
        if replaced_uniform {
            continue;
        }
        sanitized.push_str(line);
        sanitized.push('\n');
    }

    format!("{FRAGMENT_HEADER}\n{sanitized}{FRAGMENT_FOOTER}")
}

fn contains_word(text: &str, word: &str) -> bool {
    let bytes = text.as_bytes();
    let mut start = 0;
    while let Some(offset) = text[start..].find(word) {
        let begin = start + offset;
        let end = begin + word.len();
        let bounded_left = begin == 0 || !is_ident_char(bytes[begin - 1]);
        let bounded_right = end == text.len() || !is_ident_char(bytes[end]);
        if bounded_left && bounded_right {
            return true;
        }
        start = begin + 1;
    }
    false
}

fn is_ident_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// GLSL prologue injected ahead of every user fragment shader.
///
/// The uniform block layout must match `FrameUniforms` in `gpu/uniforms.rs`.
/// `main` is diverted to `fv_entry` so the footer can run coordinate fix-ups
/// before handing control to the user shader.
const FRAGMENT_HEADER: &str = r"#version 450
layout(location = 0) out vec4 fv_color;

layout(std140, set = 0, binding = 0) uniform FrameParams {
    vec2 _resolution;
    float _time;
    float _pad;
} frame;

#define resolution frame._resolution
#define time frame._time
#define gl_FragColor fv_color

vec4 fv_frag_coord;
#define gl_FragCoord fv_frag_coord
#define main fv_entry
";

/// GLSL epilogue that remaps coordinates and delegates to the user entry.
const FRAGMENT_FOOTER: &str = r"#undef main
#undef gl_FragCoord
void main() {
    fv_frag_coord = vec4(gl_FragCoord.x, frame._resolution.y - gl_FragCoord.y, gl_FragCoord.z, gl_FragCoord.w);
    fv_entry();
}
";

/// Fixed pass-through vertex shader: a 2D position attribute straight into
/// clip space, one quad vertex at a time.
const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec2 a_position;

void main() {
    gl_Position = vec4(a_position, 0.0, 1.0);
}
";

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_FRAGMENT: &str = r#"
        precision mediump float;
        uniform float time;
        uniform vec2 resolution;

        void main() {
            vec2 uv = gl_FragCoord.xy / resolution;
            gl_FragColor = vec4(uv, 0.5 + 0.5 * sin(time), 1.0);
        }
    "#;

    #[test]
    fn wrap_strips_replaced_declarations() {
        let wrapped = wrap_webgl_fragment(VALID_FRAGMENT);
        assert!(!wrapped.contains("precision mediump"));
        assert!(!wrapped.contains("uniform float time"));
        assert!(!wrapped.contains("uniform vec2 resolution"));
        assert!(wrapped.contains("FrameParams"));
        assert!(wrapped.contains("fv_entry"));
    }

    #[test]
    fn wrap_keeps_unrelated_uniforms() {
        let source = "uniform float intensity;\nvoid main() { gl_FragColor = vec4(intensity); }\n";
        let wrapped = wrap_webgl_fragment(source);
        assert!(wrapped.contains("uniform float intensity"));
    }

    #[test]
    fn valid_fragment_compiles() {
        let stage = compile_fragment_stage(VALID_FRAGMENT).expect("fragment should compile");
        assert_eq!(stage.stage, ShaderStage::Fragment);
        assert!(stage.uniforms.time);
        assert!(stage.uniforms.resolution);
    }

    #[test]
    fn broken_fragment_yields_fragment_diagnostic() {
        let diagnostic = compile_fragment_stage("void main() { gl_FragColor = nonsense(); }")
            .expect_err("fragment should be rejected");
        assert_eq!(diagnostic.stage, ShaderStage::Fragment);
        assert!(!diagnostic.message.is_empty());
    }

    #[test]
    fn fragment_without_entry_point_is_rejected() {
        assert!(compile_fragment_stage("float helper() { return 1.0; }").is_err());
    }

    #[test]
    fn builtin_vertex_stage_always_compiles() {
        let stage = compile_vertex_stage().expect("built-in vertex shader must be valid");
        assert_eq!(stage.stage, ShaderStage::Vertex);
    }

    #[test]
    fn uniform_scan_matches_whole_words_only() {
        let usage = UniformUsage::scan("float timeScale = 2.0; vec2 res = resolution;");
        assert!(!usage.time);
        assert!(usage.resolution);

        let none = UniformUsage::scan("void main() { gl_FragColor = vec4(1.0); }");
        assert!(!none.any());
    }

    #[test]
    fn shader_without_known_uniforms_compiles() {
        let stage = compile_fragment_stage("void main() { gl_FragColor = vec4(1.0, 0.0, 0.0, 1.0); }")
            .expect("constant shader should compile");
        assert!(!stage.uniforms.any());
        assert!(!stage.uniforms.needs_upload());
    }

    #[test]
    fn frag_coord_alone_still_needs_frame_data() {
        let usage = UniformUsage::scan("void main() { gl_FragColor = vec4(gl_FragCoord.xy, 0.0, 1.0); }");
        assert!(!usage.any());
        assert!(usage.needs_upload());
    }
}
