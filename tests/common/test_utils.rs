#![allow(dead_code)]

use std::{cell::Cell, io::Cursor, path::PathBuf, rc::Rc};

use clip_viewer::{
    data_structures::instance::Instance,
    resources::{
        animation::{Channel, Clip, Keyframes, Pose, Track},
        fbx::{Attr, FbxNode},
        import::TICKS_PER_SECOND,
    },
    viewer::session::{Loaded, Resident},
};
use fbxcel::{
    low::FbxVersion,
    writer::v7400::binary::{AttributesWriter, FbxFooter, Writer},
};

/// Counters shared between a [`MockModel`] and the test that created it.
#[derive(Clone, Default)]
pub(crate) struct Counters {
    disposed: Rc<Cell<u32>>,
    posed: Rc<Cell<u32>>,
}

impl Counters {
    pub fn disposals(&self) -> u32 {
        self.disposed.get()
    }

    pub fn poses(&self) -> u32 {
        self.posed.get()
    }
}

/// Stands in for an uploaded scene graph.
pub(crate) struct MockModel {
    pub name: String,
    pub last_pose: Option<Pose>,
    counts: Counters,
}

impl MockModel {
    pub fn new(name: &str) -> (Self, Counters) {
        let counts = Counters::default();
        (
            Self {
                name: name.to_string(),
                last_pose: None,
                counts: counts.clone(),
            },
            counts,
        )
    }
}

impl Resident for MockModel {
    fn dispose(&mut self) {
        self.counts.disposed.set(self.counts.disposed.get() + 1);
    }

    fn apply_pose(&mut self, pose: &Pose) {
        self.counts.posed.set(self.counts.posed.get() + 1);
        self.last_pose = Some(pose.clone());
    }
}

pub(crate) fn loaded(name: &str, clips: Vec<Clip>) -> (Loaded<MockModel>, Counters) {
    let (model, counts) = MockModel::new(name);
    (Loaded { model, clips }, counts)
}

/// A clip moving node 0 along x from 0 to `duration` over `duration` seconds.
pub(crate) fn slide_clip(name: &str, duration: f32) -> Clip {
    Clip::new(
        name,
        vec![Track {
            node: 0,
            rest: Instance::new(),
            channels: vec![Channel {
                timestamps: vec![0.0, duration],
                keyframes: Keyframes::Translation(vec![
                    cgmath::Vector3::new(0.0, 0.0, 0.0),
                    cgmath::Vector3::new(duration, 0.0, 0.0),
                ]),
            }],
        }],
    )
}

pub(crate) fn asset_root() -> PathBuf {
    PathBuf::from("/srv/viewer")
}

// FBX tree builders. Object names use the binary `name\0\x01Class` form.

pub(crate) fn s(value: &str) -> Attr {
    Attr::Str(value.to_string())
}

pub(crate) fn node(name: &str, attrs: Vec<Attr>, children: Vec<FbxNode>) -> FbxNode {
    FbxNode::new(name, attrs, children)
}

pub(crate) fn leaf(name: &str, attr: Attr) -> FbxNode {
    FbxNode::new(name, vec![attr], vec![])
}

pub(crate) fn prop(name: &str, values: &[f64]) -> FbxNode {
    let mut attrs = vec![s(name), s("Lcl"), s(""), s("A")];
    attrs.extend(values.iter().map(|&v| Attr::Float(v)));
    node("P", attrs, vec![])
}

pub(crate) fn properties(entries: Vec<FbxNode>) -> FbxNode {
    node("Properties70", vec![], entries)
}

pub(crate) fn model(id: i64, name: &str, props: Vec<FbxNode>) -> FbxNode {
    node(
        "Model",
        vec![Attr::Int(id), s(&format!("{name}\0\x01Model")), s("Mesh")],
        vec![properties(props)],
    )
}

pub(crate) fn geometry(id: i64, vertices: &[f64], polygons: &[i64], extra: Vec<FbxNode>) -> FbxNode {
    let mut children = vec![
        leaf("Vertices", Attr::Floats(vertices.to_vec())),
        leaf("PolygonVertexIndex", Attr::Ints(polygons.to_vec())),
    ];
    children.extend(extra);
    node(
        "Geometry",
        vec![Attr::Int(id), s("Body\0\x01Geometry"), s("Mesh")],
        children,
    )
}

pub(crate) fn normal_layer(mapping: &str, reference: &str, normals: &[f64], index: Option<&[i64]>) -> FbxNode {
    let mut children = vec![
        leaf("MappingInformationType", s(mapping)),
        leaf("ReferenceInformationType", s(reference)),
        leaf("Normals", Attr::Floats(normals.to_vec())),
    ];
    if let Some(index) = index {
        children.push(leaf("NormalsIndex", Attr::Ints(index.to_vec())));
    }
    node("LayerElementNormal", vec![Attr::Int(0)], children)
}

pub(crate) fn stack(id: i64, name: &str) -> FbxNode {
    node(
        "AnimationStack",
        vec![Attr::Int(id), s(&format!("{name}\0\x01AnimStack")), s("")],
        vec![],
    )
}

pub(crate) fn layer(id: i64) -> FbxNode {
    node(
        "AnimationLayer",
        vec![Attr::Int(id), s("BaseLayer\0\x01AnimLayer"), s("")],
        vec![],
    )
}

pub(crate) fn curve_node(id: i64, defaults: [f64; 3]) -> FbxNode {
    node(
        "AnimationCurveNode",
        vec![Attr::Int(id), s("T\0\x01AnimCurveNode"), s("")],
        vec![properties(vec![
            prop("d|X", &[defaults[0]]),
            prop("d|Y", &[defaults[1]]),
            prop("d|Z", &[defaults[2]]),
        ])],
    )
}

pub(crate) fn curve(id: i64, seconds: &[f64], values: &[f64]) -> FbxNode {
    let ticks = seconds
        .iter()
        .map(|&t| (t * TICKS_PER_SECOND).round() as i64)
        .collect();
    node(
        "AnimationCurve",
        vec![Attr::Int(id), s("\0\x01AnimCurve"), s("")],
        vec![
            leaf("KeyTime", Attr::Ints(ticks)),
            leaf("KeyValueFloat", Attr::Floats(values.to_vec())),
        ],
    )
}

pub(crate) fn oo(child: i64, parent: i64) -> FbxNode {
    node("C", vec![s("OO"), Attr::Int(child), Attr::Int(parent)], vec![])
}

pub(crate) fn op(child: i64, parent: i64, property: &str) -> FbxNode {
    node(
        "C",
        vec![s("OP"), Attr::Int(child), Attr::Int(parent), s(property)],
        vec![],
    )
}

pub(crate) fn document(objects: Vec<FbxNode>, connections: Vec<FbxNode>) -> FbxNode {
    node(
        "",
        vec![],
        vec![
            node("Objects", vec![], objects),
            node("Connections", vec![], connections),
        ],
    )
}

pub(crate) fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

/// Serialises a document built with the helpers above as binary FBX 7.4.
///
/// Numbers are written at the narrowest width that holds them exactly, the way
/// exporters store index arrays as `i32` and key values as `f32`.
pub(crate) fn binary_fbx(doc: &FbxNode) -> Vec<u8> {
    let mut writer = Writer::new(Cursor::new(Vec::new()), FbxVersion::V7_4).expect("header");
    for child in &doc.children {
        write_node(&mut writer, child);
    }
    writer
        .finalize_and_flush(&FbxFooter::default())
        .expect("footer")
        .into_inner()
}

fn write_node(writer: &mut Writer<Cursor<Vec<u8>>>, node: &FbxNode) {
    {
        let mut attrs = writer.new_node(&node.name).expect("node");
        for attr in &node.attrs {
            write_attr(&mut attrs, attr);
        }
    }
    for child in &node.children {
        write_node(writer, child);
    }
    writer.close_node().expect("close");
}

fn write_attr(attrs: &mut AttributesWriter<'_, Cursor<Vec<u8>>>, attr: &Attr) {
    let fits_i32 = |v: i64| i32::try_from(v).is_ok();
    let fits_f32 = |v: f64| f64::from(v as f32) == v;
    match attr {
        Attr::Bool(v) => attrs.append_bool(*v),
        Attr::Int(v) if fits_i32(*v) => attrs.append_i32(*v as i32),
        Attr::Int(v) => attrs.append_i64(*v),
        Attr::Float(v) if fits_f32(*v) => attrs.append_f32(*v as f32),
        Attr::Float(v) => attrs.append_f64(*v),
        Attr::Str(v) => attrs.append_string_direct(v),
        Attr::Ints(v) if v.iter().all(|&i| fits_i32(i)) => {
            attrs.append_arr_i32_from_iter(None, v.iter().map(|&i| i as i32))
        }
        Attr::Ints(v) => attrs.append_arr_i64_from_iter(None, v.iter().copied()),
        Attr::Floats(v) if v.iter().all(|&f| fits_f32(f)) => {
            attrs.append_arr_f32_from_iter(None, v.iter().map(|&f| f as f32))
        }
        Attr::Floats(v) => attrs.append_arr_f64_from_iter(None, v.iter().copied()),
        Attr::Bytes(v) => attrs.append_binary_direct(v),
    }
    .expect("attribute");
}
