//! FBX node tree → [`ModelAsset`].
//!
//! Everything here is CPU-only and `Send`, so decoding can run off the UI
//! thread. The result is uploaded later by [`crate::resources::mesh`].
//!
//! Objects are linked through the document's `Connections` section:
//! `OO` links attach an object to another object (geometry to model, model
//! to parent model, layer to stack), `OP` links attach an object to a named
//! property (curve node to `Lcl Rotation`, curve to `d|X`).

use std::collections::{BTreeMap, HashMap, HashSet};

use cgmath::{InnerSpace, Rotation3, Zero};

use crate::{
    config::hex_to_linear,
    data_structures::{instance::Instance, model::ModelVertex, model::MaterialUniform},
    error::LoadCause,
    resources::{
        animation::{Channel, Clip, Keyframes, Track},
        fbx::FbxNode,
    },
};

/// FBX time unit.
pub const TICKS_PER_SECOND: f64 = 46_186_158_000.0;

#[derive(Clone, Debug, PartialEq)]
pub struct MaterialData {
    pub name: String,
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
    pub flat: bool,
}

impl MaterialData {
    /// A freshly constructed Phong material: white, dim specular, shininess 30.
    pub fn phong() -> Self {
        Self {
            name: "Phong".to_string(),
            diffuse: [1.0, 1.0, 1.0],
            specular: hex_to_linear(0x111111),
            shininess: 30.0,
            flat: false,
        }
    }

    /// Flat-shaded Phong material of the given `0xRRGGBB` colour.
    pub fn flat_phong(colour: u32) -> Self {
        Self {
            diffuse: hex_to_linear(colour),
            flat: true,
            ..Self::phong()
        }
    }

    pub fn to_uniform(&self) -> MaterialUniform {
        MaterialUniform {
            diffuse: self.diffuse,
            shininess: self.shininess,
            specular: self.specular,
            flat: if self.flat { 1.0 } else { 0.0 },
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    pub material: MaterialData,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeData {
    pub name: String,
    pub parent: Option<usize>,
    pub local: Instance,
    /// Indices into [`ModelAsset::meshes`].
    pub meshes: Vec<usize>,
}

/// A decoded, not yet uploaded model group.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelAsset {
    pub name: String,
    pub nodes: Vec<NodeData>,
    pub meshes: Vec<MeshData>,
    pub clips: Vec<Clip>,
}

impl ModelAsset {
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(idx, _)| idx)
    }

    pub fn children_of(&self, parent: usize) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, node)| node.parent == Some(parent))
            .map(|(idx, _)| idx)
    }
}

/// Strips the class from an object name: `Hips\0\x01Model` and `Model::Hips` both become `Hips`.
pub fn clean_name(raw: &str) -> String {
    if let Some((name, _)) = raw.split_once("\u{0}\u{1}") {
        return name.to_string();
    }
    if let Some((_, name)) = raw.split_once("::") {
        return name.to_string();
    }
    raw.to_string()
}

/// FBX's default rotation order (`eEulerXYZ`): x is applied first.
pub fn euler_xyz(degrees: cgmath::Vector3<f32>) -> cgmath::Quaternion<f32> {
    cgmath::Quaternion::from_angle_z(cgmath::Deg(degrees.z))
        * cgmath::Quaternion::from_angle_y(cgmath::Deg(degrees.y))
        * cgmath::Quaternion::from_angle_x(cgmath::Deg(degrees.x))
}

struct Link<'a> {
    kind: &'a str,
    child: i64,
    parent: i64,
    property: Option<&'a str>,
}

fn links(root: &FbxNode) -> Vec<Link<'_>> {
    let Some(connections) = root.child("Connections") else {
        return Vec::new();
    };
    connections
        .children_named("C")
        .filter_map(|c| {
            Some(Link {
                kind: c.attr_str(0)?,
                child: c.attr_i64(1)?,
                parent: c.attr_i64(2)?,
                property: c.attr_str(3),
            })
        })
        .collect()
}

/// `Properties70` of an object: `P: name, type, label, flags, values...`.
struct Properties<'a>(Vec<&'a FbxNode>);

impl<'a> Properties<'a> {
    fn of(object: &'a FbxNode) -> Self {
        Self(
            object
                .child("Properties70")
                .map(|props| props.children_named("P").collect())
                .unwrap_or_default(),
        )
    }

    fn find(&self, name: &str) -> Option<&'a FbxNode> {
        self.0.iter().copied().find(|p| p.attr_str(0) == Some(name))
    }

    fn scalar(&self, name: &str) -> Option<f32> {
        Some(self.find(name)?.attr(4)?.as_f64()? as f32)
    }

    fn vec3(&self, name: &str) -> Option<cgmath::Vector3<f32>> {
        let p = self.find(name)?;
        Some(cgmath::Vector3::new(
            p.attr(4)?.as_f64()? as f32,
            p.attr(5)?.as_f64()? as f32,
            p.attr(6)?.as_f64()? as f32,
        ))
    }
}

enum NormalMapping {
    ByPolygonVertex,
    ByControlPoint,
    ByPolygon,
    AllSame,
}

struct NormalLayer<'a> {
    normals: &'a [f64],
    index: Option<&'a [i64]>,
    mapping: NormalMapping,
}

impl<'a> NormalLayer<'a> {
    fn read(geometry: &'a FbxNode) -> Result<Option<Self>, LoadCause> {
        let Some(layer) = geometry.child("LayerElementNormal") else {
            return Ok(None);
        };
        let normals = layer
            .child_floats("Normals")
            .ok_or_else(|| LoadCause::Malformed("normal layer without Normals".into()))?;
        let mapping = match layer
            .child_str("MappingInformationType")
            .unwrap_or("ByPolygonVertex")
        {
            "ByPolygonVertex" => NormalMapping::ByPolygonVertex,
            "ByVertice" | "ByVertex" => NormalMapping::ByControlPoint,
            "ByPolygon" => NormalMapping::ByPolygon,
            "AllSame" => NormalMapping::AllSame,
            other => {
                return Err(LoadCause::Malformed(format!(
                    "unsupported normal mapping {other}"
                )));
            }
        };
        let index = match layer
            .child_str("ReferenceInformationType")
            .unwrap_or("Direct")
        {
            "Direct" => None,
            "IndexToDirect" | "Index" => Some(layer.child_ints("NormalsIndex").ok_or_else(
                || LoadCause::Malformed("indexed normals without NormalsIndex".into()),
            )?),
            other => {
                return Err(LoadCause::Malformed(format!(
                    "unsupported normal reference {other}"
                )));
            }
        };
        Ok(Some(Self {
            normals,
            index,
            mapping,
        }))
    }

    fn lookup(
        &self,
        polygon_vertex: usize,
        control_point: usize,
        polygon: usize,
    ) -> Result<[f32; 3], LoadCause> {
        let slot = match self.mapping {
            NormalMapping::ByPolygonVertex => polygon_vertex,
            NormalMapping::ByControlPoint => control_point,
            NormalMapping::ByPolygon => polygon,
            NormalMapping::AllSame => 0,
        };
        let slot = match self.index {
            Some(index) => index
                .get(slot)
                .and_then(|&i| usize::try_from(i).ok())
                .ok_or_else(|| LoadCause::Malformed(format!("normal index {slot} out of range")))?,
            None => slot,
        };
        match self.normals.get(slot * 3..slot * 3 + 3) {
            Some(n) => Ok([n[0] as f32, n[1] as f32, n[2] as f32]),
            None => Err(LoadCause::Malformed(format!("normal {slot} out of range"))),
        }
    }
}

/// Fan-triangulates one closed polygon occupying `vertices[start..]`.
fn close_polygon(
    vertices: &mut [ModelVertex],
    indices: &mut Vec<u32>,
    start: usize,
    needs_face_normal: bool,
) {
    let end = vertices.len();
    if end - start < 3 {
        return;
    }
    if needs_face_normal {
        let p = |i: usize| cgmath::Vector3::from(vertices[i].position);
        let normal = (p(start + 1) - p(start)).cross(p(start + 2) - p(start));
        let normal = if normal.magnitude2() > 0.0 {
            normal.normalize()
        } else {
            cgmath::Vector3::unit_y()
        };
        for vertex in &mut vertices[start..end] {
            vertex.normal = normal.into();
        }
    }
    for i in start + 1..end - 1 {
        indices.extend([start as u32, i as u32, (i + 1) as u32]);
    }
}

/// Expands a `Geometry` into one vertex per polygon corner plus triangle indices.
pub fn triangulate(geometry: &FbxNode) -> Result<(Vec<ModelVertex>, Vec<u32>), LoadCause> {
    let positions = geometry
        .child_floats("Vertices")
        .ok_or_else(|| LoadCause::Malformed("geometry without Vertices".into()))?;
    let polygon_vertices = geometry
        .child_ints("PolygonVertexIndex")
        .ok_or_else(|| LoadCause::Malformed("geometry without PolygonVertexIndex".into()))?;
    let control_points = positions.len() / 3;
    let normals = NormalLayer::read(geometry)?;

    let mut vertices = Vec::with_capacity(polygon_vertices.len());
    let mut indices = Vec::with_capacity(polygon_vertices.len() * 3 / 2);
    let mut polygon_start = 0;
    let mut polygon = 0;

    for (polygon_vertex, &raw) in polygon_vertices.iter().enumerate() {
        // The last corner of every polygon is stored as `-(index) - 1`.
        let closes = raw < 0;
        let control_point = (if closes { !raw } else { raw }) as usize;
        if control_point >= control_points {
            return Err(LoadCause::Malformed(format!(
                "polygon vertex {polygon_vertex} references control point {control_point} of {control_points}"
            )));
        }
        let position = [
            positions[control_point * 3] as f32,
            positions[control_point * 3 + 1] as f32,
            positions[control_point * 3 + 2] as f32,
        ];
        let normal = match &normals {
            Some(layer) => layer.lookup(polygon_vertex, control_point, polygon)?,
            None => [0.0; 3],
        };
        vertices.push(ModelVertex { position, normal });

        if closes {
            close_polygon(&mut vertices, &mut indices, polygon_start, normals.is_none());
            polygon_start = vertices.len();
            polygon += 1;
        }
    }
    if polygon_start < vertices.len() {
        close_polygon(&mut vertices, &mut indices, polygon_start, normals.is_none());
    }

    Ok((vertices, indices))
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum TransformProperty {
    Translation,
    Rotation,
    Scale,
}

impl TransformProperty {
    fn from_link(property: &str) -> Option<Self> {
        match property {
            "Lcl Translation" => Some(Self::Translation),
            "Lcl Rotation" => Some(Self::Rotation),
            "Lcl Scaling" => Some(Self::Scale),
            _ => None,
        }
    }
}

struct Curve {
    times: Vec<f32>,
    values: Vec<f32>,
}

impl Curve {
    fn read(node: &FbxNode) -> Option<Self> {
        let times = node
            .child_ints("KeyTime")?
            .iter()
            .map(|&t| (t as f64 / TICKS_PER_SECOND) as f32)
            .collect::<Vec<_>>();
        let values = node
            .child_floats("KeyValueFloat")?
            .iter()
            .map(|&v| v as f32)
            .collect::<Vec<_>>();
        (times.len() == values.len() && !times.is_empty()).then_some(Self { times, values })
    }

    fn evaluate(&self, t: f32) -> f32 {
        let next = self.times.partition_point(|&ts| ts <= t);
        if next == 0 {
            return self.values[0];
        }
        if next >= self.times.len() {
            return self.values[self.values.len() - 1];
        }
        let prev = next - 1;
        let span = self.times[next] - self.times[prev];
        if span <= 0.0 {
            return self.values[prev];
        }
        let alpha = (t - self.times[prev]) / span;
        self.values[prev] + (self.values[next] - self.values[prev]) * alpha
    }
}

#[derive(Default)]
struct CurveNode {
    defaults: [f32; 3],
    curves: [Option<usize>; 3],
}

impl CurveNode {
    /// Samples all three components on the union of their key times.
    fn resample(&self, curves: &[Curve]) -> Option<(Vec<f32>, Vec<cgmath::Vector3<f32>>)> {
        let components = self.curves.map(|c| c.and_then(|idx| curves.get(idx)));
        let mut times = components
            .iter()
            .flatten()
            .flat_map(|curve| curve.times.iter().copied())
            .collect::<Vec<_>>();
        if times.is_empty() {
            return None;
        }
        times.sort_by(f32::total_cmp);
        times.dedup_by(|a, b| (*a - *b).abs() < 1e-6);

        let values = times
            .iter()
            .map(|&t| {
                let component = |axis: usize| {
                    components[axis]
                        .map(|curve| curve.evaluate(t))
                        .unwrap_or(self.defaults[axis])
                };
                cgmath::Vector3::new(component(0), component(1), component(2))
            })
            .collect();
        Some((times, values))
    }
}

fn object_id(object: &FbxNode, kind: &str) -> Result<i64, LoadCause> {
    object
        .attr_i64(0)
        .ok_or_else(|| LoadCause::Malformed(format!("{kind} without id")))
}

/// Interprets a parsed FBX document as a model group named `name`.
pub fn import_document(name: &str, root: &FbxNode) -> Result<ModelAsset, LoadCause> {
    let objects = root
        .child("Objects")
        .ok_or_else(|| LoadCause::Malformed("missing Objects section".into()))?;
    let links = links(root);

    // Transform hierarchy
    let mut nodes = Vec::new();
    let mut pre_rotations = Vec::new();
    let mut node_by_id = HashMap::new();
    for model in objects.children_named("Model") {
        let id = object_id(model, "Model")?;
        let props = Properties::of(model);
        let pre_rotation = props
            .vec3("PreRotation")
            .map(euler_xyz)
            .unwrap_or(cgmath::Quaternion::from_angle_x(cgmath::Deg(0.0)));
        let local = Instance {
            position: props
                .vec3("Lcl Translation")
                .unwrap_or(cgmath::Vector3::zero()),
            rotation: pre_rotation
                * euler_xyz(props.vec3("Lcl Rotation").unwrap_or(cgmath::Vector3::zero())),
            scale: props
                .vec3("Lcl Scaling")
                .unwrap_or(cgmath::Vector3::new(1.0, 1.0, 1.0)),
        };
        node_by_id.insert(id, nodes.len());
        pre_rotations.push(pre_rotation);
        nodes.push(NodeData {
            name: clean_name(model.attr_str(1).unwrap_or_default()),
            parent: None,
            local,
            meshes: Vec::new(),
        });
    }
    for link in links.iter().filter(|l| l.kind == "OO") {
        if let (Some(&child), Some(&parent)) =
            (node_by_id.get(&link.child), node_by_id.get(&link.parent))
        {
            if child != parent {
                nodes[child].parent = Some(parent);
            }
        }
    }

    // Materials are decoded so the asset is complete; preparation replaces them.
    let mut material_by_id = HashMap::new();
    for material in objects.children_named("Material") {
        let id = object_id(material, "Material")?;
        let props = Properties::of(material);
        let diffuse = props
            .vec3("DiffuseColor")
            .or_else(|| props.vec3("Diffuse"))
            .map(Into::into)
            .unwrap_or([0.8, 0.8, 0.8]);
        let specular = props
            .vec3("SpecularColor")
            .or_else(|| props.vec3("Specular"))
            .map(Into::into)
            .unwrap_or([0.2, 0.2, 0.2]);
        material_by_id.insert(
            id,
            MaterialData {
                name: clean_name(material.attr_str(1).unwrap_or_default()),
                diffuse,
                specular,
                shininess: props
                    .scalar("ShininessExponent")
                    .or_else(|| props.scalar("Shininess"))
                    .unwrap_or(20.0),
                flat: false,
            },
        );
    }

    let mut geometry_by_id = HashMap::new();
    for geometry in objects.children_named("Geometry") {
        if geometry.attr_str(2) != Some("Mesh") {
            continue;
        }
        let id = object_id(geometry, "Geometry")?;
        let (vertices, indices) = triangulate(geometry)?;
        geometry_by_id.insert(
            id,
            (clean_name(geometry.attr_str(1).unwrap_or_default()), vertices, indices),
        );
    }

    let mut meshes = Vec::new();
    for link in links.iter().filter(|l| l.kind == "OO") {
        let (Some((geometry_name, vertices, indices)), Some(&node)) =
            (geometry_by_id.get(&link.child), node_by_id.get(&link.parent))
        else {
            continue;
        };
        let material = links
            .iter()
            .filter(|l| l.kind == "OO" && l.parent == link.parent)
            .find_map(|l| material_by_id.get(&l.child))
            .cloned()
            .unwrap_or_else(MaterialData::phong);
        let name = if geometry_name.is_empty() {
            nodes[node].name.clone()
        } else {
            geometry_name.clone()
        };
        nodes[node].meshes.push(meshes.len());
        meshes.push(MeshData {
            name,
            vertices: vertices.clone(),
            indices: indices.clone(),
            material,
            cast_shadow: false,
            receive_shadow: false,
        });
    }

    let clips = import_clips(objects, &links, &nodes, &node_by_id, &pre_rotations);

    Ok(ModelAsset {
        name: name.to_string(),
        nodes,
        meshes,
        clips,
    })
}

/// One clip per `AnimationStack`, in document order. Stacks without any
/// channel bound to a known model are dropped.
fn import_clips(
    objects: &FbxNode,
    links: &[Link<'_>],
    nodes: &[NodeData],
    node_by_id: &HashMap<i64, usize>,
    pre_rotations: &[cgmath::Quaternion<f32>],
) -> Vec<Clip> {
    let mut curves = Vec::new();
    let mut curve_by_id = HashMap::new();
    for curve in objects.children_named("AnimationCurve") {
        let (Some(id), Some(parsed)) = (curve.attr_i64(0), Curve::read(curve)) else {
            continue;
        };
        curve_by_id.insert(id, curves.len());
        curves.push(parsed);
    }

    let mut curve_nodes: HashMap<i64, CurveNode> = HashMap::new();
    for node in objects.children_named("AnimationCurveNode") {
        let Some(id) = node.attr_i64(0) else { continue };
        let props = Properties::of(node);
        let defaults = ["d|X", "d|Y", "d|Z"].map(|p| props.scalar(p).unwrap_or(0.0));
        curve_nodes.insert(
            id,
            CurveNode {
                defaults,
                ..Default::default()
            },
        );
    }

    let layer_ids: HashSet<i64> = objects
        .children_named("AnimationLayer")
        .filter_map(|layer| layer.attr_i64(0))
        .collect();
    let mut layers_of_stack: HashMap<i64, HashSet<i64>> = HashMap::new();
    let mut layer_of_curve_node: HashMap<i64, i64> = HashMap::new();
    let mut targets: HashMap<i64, (usize, TransformProperty)> = HashMap::new();

    for link in links {
        match (link.kind, link.property) {
            ("OO", _) if layer_ids.contains(&link.child) => {
                layers_of_stack
                    .entry(link.parent)
                    .or_default()
                    .insert(link.child);
            }
            ("OO", _) if curve_nodes.contains_key(&link.child) && layer_ids.contains(&link.parent) => {
                layer_of_curve_node.insert(link.child, link.parent);
            }
            ("OP", Some(property)) => {
                if let (Some(&curve), Some(curve_node)) =
                    (curve_by_id.get(&link.child), curve_nodes.get_mut(&link.parent))
                {
                    let axis = match property {
                        "d|X" => 0,
                        "d|Y" => 1,
                        "d|Z" => 2,
                        _ => continue,
                    };
                    curve_node.curves[axis] = Some(curve);
                } else if let (true, Some(&node), Some(kind)) = (
                    curve_nodes.contains_key(&link.child),
                    node_by_id.get(&link.parent),
                    TransformProperty::from_link(property),
                ) {
                    targets.insert(link.child, (node, kind));
                }
            }
            _ => (),
        }
    }

    let mut clips = Vec::new();
    for stack in objects.children_named("AnimationStack") {
        let Some(stack_id) = stack.attr_i64(0) else { continue };
        let name = clean_name(stack.attr_str(1).unwrap_or_default());
        let Some(layers) = layers_of_stack.get(&stack_id) else {
            log::debug!("animation stack {name} has no layers");
            continue;
        };

        // Sorted so track and channel order does not depend on hash order.
        let mut channels_by_node: BTreeMap<usize, Vec<(TransformProperty, Channel)>> =
            BTreeMap::new();
        for (curve_node_id, layer) in &layer_of_curve_node {
            if !layers.contains(layer) {
                continue;
            }
            let (Some(&(node, kind)), Some(curve_node)) =
                (targets.get(curve_node_id), curve_nodes.get(curve_node_id))
            else {
                continue;
            };
            let Some((timestamps, values)) = curve_node.resample(&curves) else {
                continue;
            };
            let keyframes = match kind {
                TransformProperty::Translation => Keyframes::Translation(values),
                TransformProperty::Rotation => Keyframes::Rotation(
                    values
                        .into_iter()
                        .map(|euler| pre_rotations[node] * euler_xyz(euler))
                        .collect(),
                ),
                TransformProperty::Scale => Keyframes::Scale(values),
            };
            channels_by_node.entry(node).or_default().push((
                kind,
                Channel {
                    timestamps,
                    keyframes,
                },
            ));
        }

        let tracks = channels_by_node
            .into_iter()
            .map(|(node, mut channels)| {
                channels.sort_by_key(|(kind, _)| *kind);
                Track {
                    node,
                    rest: nodes[node].local,
                    channels: channels.into_iter().map(|(_, channel)| channel).collect(),
                }
            })
            .collect::<Vec<_>>();

        if tracks.is_empty() {
            log::debug!("animation stack {name} animates nothing");
            continue;
        }
        clips.push(Clip::new(name, tracks));
    }
    clips
}
