//! Node Variants
//!
//! The closed set of operations a shader graph node can perform. Every
//! variant answers the same small set of questions:
//!
//! | Capability | Method |
//! |------------|--------|
//! | Output arity and widths for given input widths | [`NodeKind::infer_outputs`] |
//! | GLSL expression for each output | [`NodeKind::emit`] |
//! | Uniforms read by the node | [`NodeKind::uniforms`] |
//! | Helper functions required | [`NodeKind::helper`] |
//! | Stage restriction | [`NodeKind::stage`] |
//!
//! # Broadcasting
//!
//! Elementwise operations accept operands that are either all of one width
//! `N` or scalars; the result has width `N`. Scalars are promoted with an
//! explicit `vecN(x)` constructor so every GLSL overload resolves (e.g.
//! `pow` and `mix` have no mixed scalar/vector forms). Geometric operations
//! never broadcast.

use smallvec::{SmallVec, smallvec};

use shadeloom_core::{
    Component, GraphError, Result, Stage, UniformDecl, UniformType, UniformValue, VectorType,
};

use crate::builtins::{self, HelperFunction};
use crate::expression::ExpressionTemplate;

pub type Outputs = SmallVec<[VectorType; 1]>;

// ============================================================================
// Operation Parameters
// ============================================================================

/// Single-input functions applied componentwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryFunc {
    Negate,
    OneMinus,
    Abs,
    Sign,
    Floor,
    Ceil,
    Fract,
    Sqrt,
    InverseSqrt,
    Exp,
    Ln,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Normalize,
    Saturate,
    /// Vector length; always produces a `float`.
    Length,
}

impl UnaryFunc {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Negate => "negate",
            Self::OneMinus => "oneMinus",
            Self::Abs => "abs",
            Self::Sign => "sign",
            Self::Floor => "floor",
            Self::Ceil => "ceil",
            Self::Fract => "fract",
            Self::Sqrt => "sqrt",
            Self::InverseSqrt => "inverseSqrt",
            Self::Exp => "exp",
            Self::Ln => "ln",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Asin => "asin",
            Self::Acos => "acos",
            Self::Atan => "atan",
            Self::Normalize => "normalize",
            Self::Saturate => "saturate",
            Self::Length => "length",
        }
    }

    fn apply(self, x: &str) -> String {
        let func = match self {
            Self::Negate => return format!("-({x})"),
            Self::OneMinus => return format!("1.0 - {x}"),
            Self::Saturate => return format!("clamp({x}, 0.0, 1.0)"),
            Self::Abs => "abs",
            Self::Sign => "sign",
            Self::Floor => "floor",
            Self::Ceil => "ceil",
            Self::Fract => "fract",
            Self::Sqrt => "sqrt",
            Self::InverseSqrt => "inversesqrt",
            Self::Exp => "exp",
            Self::Ln => "log",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Asin => "asin",
            Self::Acos => "acos",
            Self::Atan => "atan",
            Self::Normalize => "normalize",
            Self::Length => "length",
        };
        format!("{func}({x})")
    }
}

/// Shaping applied to the interpolation factor before mixing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Interpolation {
    #[default]
    Linear,
    /// Hermite `smoothstep` easing.
    Smooth,
    /// Quintic easing with zero first and second derivatives at the ends.
    VerySmooth,
}

/// Texture dimensionality of a sample node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureDim {
    D2,
    D3,
}

impl TextureDim {
    #[must_use]
    pub const fn coord_type(self) -> VectorType {
        match self {
            Self::D2 => VectorType::Vec2,
            Self::D3 => VectorType::Vec3,
        }
    }

    #[must_use]
    pub const fn sampler_type(self) -> UniformType {
        match self {
            Self::D2 => UniformType::Sampler2D,
            Self::D3 => UniformType::Sampler3D,
        }
    }
}

/// Selectable output of a texture sample node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureChannel {
    Rgba,
    Rgb,
    R,
    G,
    B,
    A,
}

impl TextureChannel {
    pub const ALL: [Self; 6] = [Self::Rgba, Self::Rgb, Self::R, Self::G, Self::B, Self::A];

    /// Output index of this channel on a sample node.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn ty(self) -> VectorType {
        match self {
            Self::Rgba => VectorType::Vec4,
            Self::Rgb => VectorType::Vec3,
            Self::R | Self::G | Self::B | Self::A => VectorType::Float,
        }
    }

    const fn swizzle(self) -> &'static str {
        match self {
            Self::Rgba => "",
            Self::Rgb => ".rgb",
            Self::R => ".r",
            Self::G => ".g",
            Self::B => ".b",
            Self::A => ".a",
        }
    }
}

/// Camera state exposed through built-in uniforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraValue {
    Position,
    Forward,
    Up,
    Side,
    NearPlane,
    FarPlane,
}

impl CameraValue {
    #[must_use]
    pub const fn uniform_name(self) -> &'static str {
        match self {
            Self::Position => builtins::CAMERA_POSITION,
            Self::Forward => builtins::CAMERA_FORWARD,
            Self::Up => builtins::CAMERA_UP,
            Self::Side => builtins::CAMERA_SIDE,
            Self::NearPlane => builtins::Z_NEAR,
            Self::FarPlane => builtins::Z_FAR,
        }
    }

    #[must_use]
    pub const fn ty(self) -> VectorType {
        match self {
            Self::Position | Self::Forward | Self::Up | Self::Side => VectorType::Vec3,
            Self::NearPlane | Self::FarPlane => VectorType::Float,
        }
    }
}

/// Coordinate spaces along the object → screen transform chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Space {
    Object,
    World,
    View,
    /// Clip space; points in it are `vec4`.
    Screen,
}

/// Matrix expression taking `lo` to `hi` (`lo < hi`) and the uniforms it reads.
fn forward_matrix(lo: Space, hi: Space) -> (&'static str, &'static [&'static str]) {
    use Space::{Object, Screen, View, World};
    match (lo, hi) {
        (Object, World) => ("u_world", &[builtins::WORLD_MATRIX]),
        (World, View) => ("u_view", &[builtins::VIEW_MATRIX]),
        (View, Screen) => ("u_proj", &[builtins::PROJ_MATRIX]),
        (Object, View) => (
            "u_view * u_world",
            &[builtins::VIEW_MATRIX, builtins::WORLD_MATRIX],
        ),
        (World, Screen) => ("u_viewProj", &[builtins::VIEW_PROJ_MATRIX]),
        _ => ("u_wvp", &[builtins::WVP_MATRIX]),
    }
}

// ============================================================================
// Emission Input
// ============================================================================

/// Generated expression of one input, as seen by the consuming node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub text: String,
    pub ty: VectorType,
}

impl Expr {
    /// The expression widened to `target` when it is a scalar.
    #[must_use]
    pub fn promoted(&self, target: VectorType) -> String {
        if self.ty.is_scalar() && !target.is_scalar() {
            format!("{}({})", target.glsl_name(), self.text)
        } else {
            self.text.clone()
        }
    }
}

// ============================================================================
// Node Kinds
// ============================================================================

#[derive(Debug, Clone, PartialEq, Hash)]
pub enum NodeKind {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Pow,
    Log,
    Min,
    Max,
    Clamp,
    Unary(UnaryFunc),
    Swizzle(SmallVec<[Component; 4]>),
    Combine,
    Cross,
    Dot,
    Distance,
    Reflect,
    Refract,
    RotateAroundAxis,
    Lerp(Interpolation),
    TextureSample {
        sampler: String,
        dim: TextureDim,
    },
    VertexInput {
        index: usize,
        name: String,
        ty: VectorType,
    },
    FragmentInput {
        index: u32,
        ty: VectorType,
    },
    Camera(CameraValue),
    ElapsedTime,
    TransformPoint {
        from: Space,
        to: Space,
    },
    Parameter {
        name: String,
        ty: VectorType,
        initial: Option<UniformValue>,
    },
    CustomExpression(ExpressionTemplate),
}

impl NodeKind {
    /// Name used for generated variables unless the node is renamed.
    #[must_use]
    pub fn default_name(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "sub",
            Self::Multiply => "mul",
            Self::Divide => "div",
            Self::Modulo => "mod",
            Self::Pow => "pow",
            Self::Log => "log",
            Self::Min => "min",
            Self::Max => "max",
            Self::Clamp => "clamp",
            Self::Unary(func) => func.name(),
            Self::Swizzle(_) => "swizzle",
            Self::Combine => "combine",
            Self::Cross => "cross",
            Self::Dot => "dot",
            Self::Distance => "distance",
            Self::Reflect => "reflect",
            Self::Refract => "refract",
            Self::RotateAroundAxis => "rotate",
            Self::Lerp(_) => "lerp",
            Self::TextureSample { dim: TextureDim::D2, .. } => "tex2D",
            Self::TextureSample { dim: TextureDim::D3, .. } => "tex3D",
            Self::VertexInput { .. } => "vertIn",
            Self::FragmentInput { .. } => "fragIn",
            Self::Camera(_) => "camera",
            Self::ElapsedTime => "time",
            Self::TransformPoint { .. } => "transform",
            Self::Parameter { .. } => "param",
            Self::CustomExpression(_) => "expr",
        }
    }

    /// The only stage this node may be emitted into, if restricted.
    #[must_use]
    pub const fn stage(&self) -> Option<Stage> {
        match self {
            Self::VertexInput { .. } => Some(Stage::Vertex),
            Self::FragmentInput { .. } => Some(Stage::Fragment),
            _ => None,
        }
    }

    #[must_use]
    pub const fn helper(&self) -> Option<&'static HelperFunction> {
        match self {
            Self::RotateAroundAxis => Some(&builtins::ROTATE_AROUND_AXIS),
            _ => None,
        }
    }

    /// Validates input widths and returns the output types.
    pub fn infer_outputs(&self, inputs: &[VectorType]) -> Result<Outputs> {
        let op = self.default_name();
        let single = |ty: VectorType| -> Result<Outputs> { Ok(smallvec![ty]) };

        match self {
            Self::Add | Self::Multiply => {
                expect_at_least(op, inputs, 2)?;
                single(broadcast(op, inputs)?)
            }
            Self::Subtract
            | Self::Divide
            | Self::Modulo
            | Self::Pow
            | Self::Log
            | Self::Min
            | Self::Max => {
                expect_arity(op, inputs, 2, "2")?;
                single(broadcast(op, inputs)?)
            }
            Self::Clamp | Self::Lerp(_) => {
                expect_arity(op, inputs, 3, "3")?;
                single(broadcast(op, inputs)?)
            }
            Self::Unary(func) => {
                expect_arity(op, inputs, 1, "1")?;
                if *func == UnaryFunc::Length {
                    single(VectorType::Float)
                } else {
                    single(inputs[0])
                }
            }
            Self::Swizzle(components) => {
                expect_arity(op, inputs, 1, "1")?;
                let width = inputs[0].width();
                if let Some(bad) = components.iter().find(|c| c.index() >= width) {
                    return Err(GraphError::InvalidComponent {
                        component: bad.letter(),
                        width,
                    });
                }
                VectorType::from_width(components.len())
                    .ok_or_else(|| mismatch(op, "1 to 4 components", components.len()))
                    .and_then(single)
            }
            Self::Combine => {
                expect_at_least(op, inputs, 2)?;
                let total: usize = inputs.iter().map(|t| usize::from(t.width())).sum();
                VectorType::from_width(total)
                    .ok_or_else(|| mismatch(op, "at most 4 components in total", list(inputs)))
                    .and_then(single)
            }
            Self::Cross => {
                expect_arity(op, inputs, 2, "2")?;
                exact(op, inputs, &[VectorType::Vec3, VectorType::Vec3])?;
                single(VectorType::Vec3)
            }
            Self::Dot | Self::Distance => {
                expect_arity(op, inputs, 2, "2")?;
                same_width(op, inputs)?;
                single(VectorType::Float)
            }
            Self::Reflect => {
                expect_arity(op, inputs, 2, "2")?;
                same_width(op, inputs)?;
                single(inputs[0])
            }
            Self::Refract => {
                expect_arity(op, inputs, 3, "3")?;
                same_width(op, &inputs[..2])?;
                if !inputs[2].is_scalar() {
                    return Err(mismatch(op, "float refraction ratio", list(inputs)));
                }
                single(inputs[0])
            }
            Self::RotateAroundAxis => {
                expect_arity(op, inputs, 3, "3")?;
                exact(
                    op,
                    inputs,
                    &[VectorType::Vec3, VectorType::Vec3, VectorType::Float],
                )?;
                single(VectorType::Vec3)
            }
            Self::TextureSample { dim, .. } => {
                expect_arity(op, inputs, 1, "1")?;
                exact(op, inputs, &[dim.coord_type()])?;
                Ok(TextureChannel::ALL.iter().map(|c| c.ty()).collect())
            }
            Self::VertexInput { ty, .. } | Self::FragmentInput { ty, .. } | Self::Parameter { ty, .. } => {
                expect_arity(op, inputs, 0, "0")?;
                single(*ty)
            }
            Self::Camera(value) => {
                expect_arity(op, inputs, 0, "0")?;
                single(value.ty())
            }
            Self::ElapsedTime => {
                expect_arity(op, inputs, 0, "0")?;
                single(VectorType::Float)
            }
            Self::TransformPoint { from, to } => {
                expect_arity(op, inputs, 1, "1")?;
                exact(op, inputs, &[VectorType::Vec3])?;
                if *from == Space::Screen && *to != Space::Screen {
                    return Err(GraphError::UnsupportedOperation(format!(
                        "transform from screen space to {to:?} space"
                    )));
                }
                single(if *to == Space::Screen {
                    VectorType::Vec4
                } else {
                    VectorType::Vec3
                })
            }
            Self::CustomExpression(template) => single(template.output()),
        }
    }

    /// Uniforms read by this node.
    #[must_use]
    pub fn uniforms(&self) -> SmallVec<[UniformDecl; 2]> {
        match self {
            Self::TextureSample { sampler, dim } => {
                smallvec![UniformDecl::new(sampler.as_str(), dim.sampler_type())]
            }
            Self::Camera(value) => {
                smallvec![UniformDecl::new(value.uniform_name(), value.ty().into())]
            }
            Self::ElapsedTime => {
                smallvec![UniformDecl::new(builtins::ELAPSED_TIME, VectorType::Float.into())]
            }
            Self::TransformPoint { from, to } if from != to => {
                let (_, names) = forward_matrix((*from).min(*to), (*from).max(*to));
                names
                    .iter()
                    .map(|name| UniformDecl::new(*name, UniformType::Mat4))
                    .collect()
            }
            Self::Parameter { name, ty, initial } => {
                let decl = UniformDecl::new(name.as_str(), (*ty).into());
                smallvec![match initial {
                    Some(value) => decl.with_initial(*value),
                    None => decl,
                }]
            }
            _ => SmallVec::new(),
        }
    }

    /// Right-hand side of the declaration of every output.
    ///
    /// `vars` holds this node's own output variable names, so later outputs
    /// may reuse earlier ones. `varying_prefix` names fragment inputs.
    #[must_use]
    pub fn emit(
        &self,
        inputs: &[Expr],
        outputs: &[VectorType],
        vars: &[String],
        varying_prefix: &str,
    ) -> SmallVec<[String; 1]> {
        let out = outputs[0];
        let arg = |i: usize| inputs[i].promoted(out);
        let call = |func: &str| {
            let args: Vec<String> = (0..inputs.len()).map(arg).collect();
            format!("{func}({})", args.join(", "))
        };
        let infix = |sep: &str| {
            let args: Vec<String> = (0..inputs.len()).map(arg).collect();
            args.join(sep)
        };

        let expr = match self {
            Self::Add => infix(" + "),
            Self::Subtract => infix(" - "),
            Self::Multiply => infix(" * "),
            Self::Divide => infix(" / "),
            Self::Modulo => call("mod"),
            Self::Pow => call("pow"),
            Self::Log => format!("log({}) / log({})", arg(0), arg(1)),
            Self::Min => call("min"),
            Self::Max => call("max"),
            Self::Clamp => call("clamp"),
            Self::Unary(func) => func.apply(&inputs[0].text),
            Self::Swizzle(components) => {
                let input = &inputs[0];
                if input.ty.is_scalar() {
                    input.promoted(out)
                } else {
                    let letters: String = components.iter().map(|c| c.letter()).collect();
                    format!("{}.{letters}", input.text)
                }
            }
            Self::Combine => {
                let args: Vec<&str> = inputs.iter().map(|e| e.text.as_str()).collect();
                format!("{}({})", out.glsl_name(), args.join(", "))
            }
            Self::Cross => format!("cross({}, {})", inputs[0].text, inputs[1].text),
            Self::Dot => format!("dot({}, {})", inputs[0].text, inputs[1].text),
            Self::Distance => format!("distance({}, {})", inputs[0].text, inputs[1].text),
            Self::Reflect => format!("reflect({}, {})", inputs[0].text, inputs[1].text),
            Self::Refract => format!(
                "refract({}, {}, {})",
                inputs[0].text, inputs[1].text, inputs[2].text
            ),
            Self::RotateAroundAxis => format!(
                "{}({}, {}, {})",
                builtins::ROTATE_AROUND_AXIS.name,
                inputs[0].text,
                inputs[1].text,
                inputs[2].text
            ),
            Self::Lerp(shape) => {
                let t = &inputs[2].text;
                let factor = match shape {
                    Interpolation::Linear => t.clone(),
                    Interpolation::Smooth => format!("smoothstep(0.0, 1.0, {t})"),
                    Interpolation::VerySmooth => {
                        format!("{t} * {t} * {t} * ({t} * ({t} * 6.0 - 15.0) + 10.0)")
                    }
                };
                format!("mix({}, {}, {factor})", arg(0), arg(1))
            }
            Self::TextureSample { sampler, .. } => {
                let sample = format!("texture({sampler}, {})", inputs[0].text);
                return TextureChannel::ALL
                    .iter()
                    .map(|channel| match channel {
                        TextureChannel::Rgba => sample.clone(),
                        _ => format!("{}{}", vars[0], channel.swizzle()),
                    })
                    .collect();
            }
            Self::VertexInput { name, .. } => name.clone(),
            Self::FragmentInput { index, .. } => format!("{varying_prefix}{index}"),
            Self::Camera(value) => value.uniform_name().to_string(),
            Self::ElapsedTime => builtins::ELAPSED_TIME.to_string(),
            Self::TransformPoint { from, to } => transform_expr(&inputs[0].text, *from, *to),
            Self::Parameter { name, .. } => name.clone(),
            Self::CustomExpression(template) => {
                let texts: Vec<String> = inputs.iter().map(|e| e.text.clone()).collect();
                template.substitute(&texts)
            }
        };
        smallvec![expr]
    }
}

fn transform_expr(point: &str, from: Space, to: Space) -> String {
    if from == to {
        return if to == Space::Screen {
            format!("vec4({point}, 1.0)")
        } else {
            point.to_string()
        };
    }

    let (matrix, _) = forward_matrix(from.min(to), from.max(to));
    let matrix = if from < to {
        matrix.to_string()
    } else {
        format!("inverse({matrix})")
    };
    let product = format!("{matrix} * vec4({point}, 1.0)");
    if to == Space::Screen {
        product
    } else {
        format!("({product}).xyz")
    }
}

// ============================================================================
// Validation Helpers
// ============================================================================

fn list(inputs: &[VectorType]) -> String {
    let names: Vec<&str> = inputs.iter().map(|t| t.glsl_name()).collect();
    names.join(", ")
}

fn mismatch(op: &'static str, expected: impl Into<String>, found: impl ToString) -> GraphError {
    GraphError::WidthMismatch {
        op,
        expected: expected.into(),
        found: found.to_string(),
    }
}

fn expect_arity(
    op: &'static str,
    inputs: &[VectorType],
    count: usize,
    expected: &'static str,
) -> Result<()> {
    if inputs.len() == count {
        Ok(())
    } else {
        Err(GraphError::InvalidArity {
            op,
            expected,
            found: inputs.len(),
        })
    }
}

fn expect_at_least(op: &'static str, inputs: &[VectorType], count: usize) -> Result<()> {
    if inputs.len() >= count {
        Ok(())
    } else {
        Err(GraphError::InvalidArity {
            op,
            expected: "at least 2",
            found: inputs.len(),
        })
    }
}

/// Result width of an elementwise operation.
fn broadcast(op: &'static str, inputs: &[VectorType]) -> Result<VectorType> {
    let target = inputs.iter().copied().max().unwrap_or(VectorType::Float);
    if inputs.iter().all(|&t| t == target || t.is_scalar()) {
        Ok(target)
    } else {
        Err(mismatch(op, format!("{target} or float operands"), list(inputs)))
    }
}

fn same_width(op: &'static str, inputs: &[VectorType]) -> Result<()> {
    if inputs.windows(2).all(|w| w[0] == w[1]) {
        Ok(())
    } else {
        Err(mismatch(op, "operands of equal width", list(inputs)))
    }
}

fn exact(op: &'static str, inputs: &[VectorType], expected: &[VectorType]) -> Result<()> {
    if inputs == expected {
        Ok(())
    } else {
        Err(mismatch(op, list(expected), list(inputs)))
    }
}
