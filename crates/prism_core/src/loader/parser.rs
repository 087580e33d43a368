//! Command dispatcher for `.ray` scene files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use prism_math::{DMat4, DQuat, DVec3, UVec2};

use super::lexer::{Lexer, ParamList, ParseError, ParseResult, TokenKind};
use super::{LoadError, LoadResult};
use crate::material::Material;
use crate::mesh::Mesh;
use crate::scene::{ContainerKind, SceneDescription, SceneObject, SphericalLight};
use crate::shape::Shape;
use crate::texture::TextureCache;

/// Builds a `SceneDescription` from a token stream.
///
/// Objects capture the transform on top of the matrix stack at the time
/// they are declared. Relative mesh and texture paths are resolved against
/// `base_dir`.
pub struct Parser {
    lexer: Lexer,
    base_dir: PathBuf,
    textures: TextureCache,
    meshes: HashMap<PathBuf, Arc<Mesh>>,
    transform_stack: Vec<DMat4>,
    container: Option<ContainerKind>,
    scene: SceneDescription,
}

impl Parser {
    pub fn new(source: &str, base_dir: impl Into<PathBuf>) -> ParseResult<Self> {
        let base_dir = base_dir.into();
        Ok(Self {
            lexer: Lexer::new(source)?,
            textures: TextureCache::with_base_dir(&base_dir),
            base_dir,
            meshes: HashMap::new(),
            transform_stack: vec![DMat4::IDENTITY],
            container: None,
            scene: SceneDescription::new(),
        })
    }

    /// Run every command to the end of the input.
    pub fn parse(mut self) -> LoadResult<SceneDescription> {
        while !self.lexer.is_eof() {
            let line = self.lexer.line();
            let name = self.lexer.get_name()?;
            self.dispatch(&name, line)?;
        }

        self.scene.container = match self.container {
            Some(kind) => kind,
            None => {
                log::warn!("No container specified, defaulting to BVH");
                ContainerKind::Bvh
            }
        };

        Ok(self.scene)
    }

    fn dispatch(&mut self, name: &str, line: usize) -> LoadResult<()> {
        match name {
            "dimension" => {
                let width = to_count(self.lexer.get_number()?, line)?;
                let height = to_count(self.lexer.get_number()?, line)?;
                self.scene.options.resolution = UVec2::new(width, height);
            }
            "samples_per_pixel" => {
                self.scene.options.samples_per_pixel = to_count(self.lexer.get_number()?, line)?;
            }
            "jitter_radius" => self.scene.options.jitter_radius = self.lexer.get_number()?,
            "ambient_light" => {
                self.scene.options.ambient_light = to_vec3(&self.lexer.get_numbers(3, 3)?);
            }
            "max_ray_depth" => {
                self.scene.options.max_ray_depth = to_count(self.lexer.get_number()?, line)?;
            }
            "Perspective" => self.parse_perspective()?,
            "LookAt" => self.parse_look_at()?,
            "Material" => self.parse_material(line)?,
            "PushMatrix" => {
                let top = self.top();
                self.transform_stack.push(top);
            }
            "PopMatrix" => {
                self.transform_stack.pop();
                if self.transform_stack.is_empty() {
                    return Err(ParseError::TransformStackUnderflow { line }.into());
                }
            }
            "Translate" => {
                let offset = self.get_vec3()?;
                self.post_multiply(DMat4::from_translation(offset));
            }
            "Scale" => {
                let scale = self.get_vec3()?;
                self.post_multiply(DMat4::from_scale(scale));
            }
            "Rotate" => {
                let degrees = self.lexer.get_number()?;
                let axis = self.get_vec3()?;
                if axis.length_squared() == 0.0 {
                    return Err(ParseError::Parse {
                        line,
                        message: "rotation axis has zero length".to_string(),
                    }
                    .into());
                }
                let rotation = DQuat::from_axis_angle(axis.normalize(), degrees.to_radians());
                self.post_multiply(DMat4::from_quat(rotation));
            }
            "Sphere" => {
                let radius = self.lexer.get_number()?;
                self.finish_object(Shape::sphere(radius))?;
            }
            "Quad" => {
                let half_size = self.lexer.get_number()?;
                self.finish_object(Shape::quad(half_size))?;
            }
            "Cylinder" => {
                let radius = self.lexer.get_number()?;
                let half_height = self.lexer.get_number()?;
                self.finish_object(Shape::cylinder(radius, half_height))?;
            }
            "Mesh" => {
                let file = self.lexer.get_string()?;
                let mesh = self.load_mesh(&file)?;
                self.finish_object(Shape::Mesh(mesh))?;
            }
            "SphericalLight" => {
                let position = self.get_vec3()?;
                let params = self.lexer.get_param_list(1, 4)?;
                self.scene.lights.push(SphericalLight {
                    position,
                    emission: param_vec3(&params, "emission", line)?,
                    radius: param_scalar(&params, "radius", line)?,
                });
            }
            "container" => {
                let value = self.lexer.get_string()?;
                let kind = value
                    .parse::<ContainerKind>()
                    .map_err(|_| ParseError::UnknownContainer(value))?;
                self.container = Some(kind);
            }
            _ => {
                return Err(ParseError::UnknownCommand {
                    line,
                    name: name.to_string(),
                }
                .into())
            }
        }
        Ok(())
    }

    fn parse_perspective(&mut self) -> ParseResult<()> {
        let camera = &mut self.scene.camera;
        camera.fov_y = self.lexer.get_number()?;
        camera.aspect = self.lexer.get_number()?;
        camera.z_near = self.lexer.get_number()?;
        camera.z_far = self.lexer.get_number()?;
        Ok(())
    }

    fn parse_look_at(&mut self) -> ParseResult<()> {
        self.scene.camera.position = self.get_vec3()?;
        self.scene.camera.center = self.get_vec3()?;
        self.scene.camera.up = self.get_vec3()?;
        Ok(())
    }

    fn parse_material(&mut self, line: usize) -> LoadResult<()> {
        let name = self.lexer.get_string()?;
        let kind = self.lexer.get_string()?;
        let texture_path = self.lexer.get_string()?;
        let params = self.lexer.get_param_list(1, 4)?;

        let texture = if texture_path.is_empty() {
            None
        } else {
            Some(self.textures.load(&texture_path)?)
        };

        log::debug!("Material '{}' ({}), {} parameters", name, kind, params.len());

        self.scene.materials.insert(Material {
            name,
            texture,
            color_albedo: param_vec3(&params, "color_albedo", line)?,
            k_ambient: param_scalar(&params, "k_ambient", line)?,
            k_diffuse: param_scalar(&params, "k_diffuse", line)?,
            k_specular: param_scalar(&params, "k_specular", line)?,
            metallic: param_scalar(&params, "metallic", line)?,
            shininess: param_scalar(&params, "shininess", line)?,
            refractive_index: param_scalar(&params, "refractive_index", line)?,
            k_reflection: param_scalar(&params, "k_reflection", line)?,
            k_refraction: param_scalar(&params, "k_refraction", line)?,
        });
        Ok(())
    }

    /// Read the material name that ends every object command and record the object.
    fn finish_object(&mut self, shape: Shape) -> LoadResult<()> {
        let line = self.lexer.line();
        let material = self.lexer.get_string()?;
        if !self.scene.materials.contains(&material) {
            return Err(LoadError::MissingMaterial {
                line,
                name: material,
            });
        }

        let object = SceneObject::new(shape, material).with_transform(self.top());
        log::debug!("Object {} with material '{}'", object.shape, object.material);
        self.scene.objects.push(object);
        Ok(())
    }

    fn load_mesh(&mut self, file: &str) -> LoadResult<Arc<Mesh>> {
        let path = resolve(&self.base_dir, file);
        if let Some(mesh) = self.meshes.get(&path) {
            return Ok(mesh.clone());
        }

        let mesh = Mesh::load_obj(&path).map_err(|source| LoadError::Obj {
            path: path.clone(),
            source,
        })?;
        log::info!(
            "Loaded mesh {}: {} triangles",
            path.display(),
            mesh.triangle_count()
        );

        let mesh = Arc::new(mesh);
        self.meshes.insert(path, mesh.clone());
        Ok(mesh)
    }

    fn get_vec3(&mut self) -> ParseResult<DVec3> {
        if self.lexer.peek().kind == TokenKind::ArrayBegin {
            return Ok(to_vec3(&self.lexer.get_numbers(3, 3)?));
        }
        let x = self.lexer.get_number()?;
        let y = self.lexer.get_number()?;
        let z = self.lexer.get_number()?;
        Ok(DVec3::new(x, y, z))
    }

    fn top(&self) -> DMat4 {
        self.transform_stack
            .last()
            .copied()
            .unwrap_or(DMat4::IDENTITY)
    }

    fn post_multiply(&mut self, m: DMat4) {
        if let Some(top) = self.transform_stack.last_mut() {
            *top = *top * m;
        }
    }
}

fn resolve(base_dir: &Path, file: &str) -> PathBuf {
    let path = Path::new(file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

fn to_vec3(values: &[f64]) -> DVec3 {
    DVec3::new(values[0], values[1], values[2])
}

fn to_count(value: f64, line: usize) -> ParseResult<u32> {
    if value.is_finite() && value >= 0.0 && value <= u32::MAX as f64 {
        Ok(value as u32)
    } else {
        Err(ParseError::Parse {
            line,
            message: format!("expected a non-negative integer; got {}", value),
        })
    }
}

/// A missing key reads as zero.
fn param_scalar(params: &ParamList, key: &str, line: usize) -> ParseResult<f64> {
    match params.get(key).map(Vec::as_slice) {
        None => Ok(0.0),
        Some([value]) => Ok(*value),
        Some(values) => Err(ParseError::Parse {
            line,
            message: format!("\"{}\" expects 1 number; got {}", key, values.len()),
        }),
    }
}

/// A missing key reads as zero.
fn param_vec3(params: &ParamList, key: &str, line: usize) -> ParseResult<DVec3> {
    match params.get(key).map(Vec::as_slice) {
        None => Ok(DVec3::ZERO),
        Some([x, y, z]) => Ok(DVec3::new(*x, *y, *z)),
        Some(values) => Err(ParseError::Parse {
            line,
            message: format!("\"{}\" expects 3 numbers; got {}", key, values.len()),
        }),
    }
}
