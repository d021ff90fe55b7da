//! Tests for the mesh format and geometry buffer builder

use super::*;
use crate::binary::FileHeader;

// ========================================================================
// Helpers
// ========================================================================

fn triangle(name: &str) -> MeshObjectData {
    MeshObjectData {
        name: name.into(),
        vertex_indices: vec![0, 1, 2],
        positions: vec![AttributeData {
            name: "Position0".into(),
            data: VectorData::Vector3(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 2.0, 0.0]]),
        }],
        normals: vec![AttributeData {
            name: "Normal0".into(),
            data: VectorData::Vector4(vec![[0.0, 0.0, 1.0, 0.0]; 3]),
        }],
        texture_coordinates: vec![
            AttributeData {
                name: "map1".into(),
                data: VectorData::Vector2(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]),
            },
            AttributeData {
                name: "uvSet".into(),
                data: VectorData::Vector2(vec![[0.5, 0.5], [0.25, 0.75], [1.0, 1.0]]),
            },
        ],
        color_sets: vec![AttributeData {
            name: "colorSet1".into(),
            data: VectorData::Vector4(vec![[1.0, 0.0, 1.0, 1.0]; 3]),
        }],
        ..Default::default()
    }
}

fn skinned_triangle() -> MeshObjectData {
    MeshObjectData {
        bone_influences: vec![
            BoneInfluence {
                bone_name: "Hip".into(),
                vertex_weights: vec![
                    VertexWeight {
                        vertex_index: 0,
                        vertex_weight: 1.0,
                    },
                    VertexWeight {
                        vertex_index: 1,
                        vertex_weight: 0.5,
                    },
                ],
            },
            BoneInfluence {
                bone_name: "Waist".into(),
                vertex_weights: vec![VertexWeight {
                    vertex_index: 1,
                    vertex_weight: 0.5,
                }],
            },
        ],
        ..triangle("body")
    }
}

// ========================================================================
// Round Trip
// ========================================================================

#[test]
fn test_mesh_roundtrip() {
    let mesh = MeshData {
        objects: vec![
            triangle("a"),
            MeshObjectData {
                sub_index: 1,
                parent_bone_name: "Head".into(),
                sort_bias: -5,
                disable_depth_write: true,
                ..triangle("a")
            },
            skinned_triangle(),
        ],
        ..Default::default()
    };

    let bytes = mesh.to_bytes().unwrap();
    let parsed = MeshData::read(&bytes).unwrap();
    assert_eq!(parsed, mesh);
}

#[test]
fn test_mesh_roundtrip_single_threaded_matches_parallel() {
    let mesh = MeshData {
        objects: vec![triangle("a"), skinned_triangle(), triangle("c")],
        ..Default::default()
    };
    let serial = MeshConfig {
        parallel: false,
        ..Default::default()
    };
    assert_eq!(mesh.to_bytes_with(&serial).unwrap(), mesh.to_bytes().unwrap());
}

#[test]
fn test_mesh_reencode_is_idempotent() {
    let mut object = triangle("lossy");
    // Not exactly representable as f16 or unorm8.
    object.normals[0].data = VectorData::Vector4(vec![[0.1, 0.2, 0.3, 0.0]; 3]);
    object.color_sets[0].data = VectorData::Vector4(vec![[0.3, 0.6, 0.9, 0.7]; 3]);
    let mesh = MeshData {
        objects: vec![object],
        ..Default::default()
    };

    let first = MeshData::read(&mesh.to_bytes().unwrap()).unwrap();
    let bytes = first.to_bytes().unwrap();
    let second = MeshData::read(&bytes).unwrap();
    assert_eq!(first, second);
    assert_eq!(bytes, second.to_bytes().unwrap());
}

#[test]
fn test_empty_mesh_roundtrip() {
    let mesh = MeshData::default();
    let bytes = mesh.to_bytes().unwrap();
    assert_eq!(&bytes[0..4], b"MESH");
    assert_eq!(MeshData::read(&bytes).unwrap(), mesh);
}

#[test]
fn test_version_1_8_roundtrip() {
    let mut object = skinned_triangle();
    // 1.8 stores four-component normals as half floats too.
    object.normals[0].data = VectorData::Vector4(vec![[0.0, 1.0, 0.0, 1.0]; 3]);
    let mesh = MeshData {
        major_version: 1,
        minor_version: 8,
        objects: vec![object],
        ..Default::default()
    };
    let parsed = MeshData::read(&mesh.to_bytes().unwrap()).unwrap();
    assert_eq!(parsed, mesh);
}

#[test]
fn test_large_weight_index_needs_1_8() {
    let mut object = skinned_triangle();
    object.bone_influences[0].vertex_weights[0].vertex_index = 70_000;

    let mesh = MeshData {
        objects: vec![object.clone()],
        ..Default::default()
    };
    assert!(matches!(
        mesh.to_bytes(),
        Err(SsbhError::IndexOutOfRange { index: 70_000, .. })
    ));

    let mesh = MeshData {
        major_version: 1,
        minor_version: 8,
        objects: vec![object],
        ..Default::default()
    };
    let parsed = MeshData::read(&mesh.to_bytes().unwrap()).unwrap();
    assert_eq!(
        parsed.objects[0].bone_influences[0].vertex_weights[0].vertex_index,
        70_000
    );
}

#[test]
fn test_duplicate_rigging_groups_keep_object_order() {
    let mut second = skinned_triangle();
    second.bone_influences.truncate(1);
    second.bone_influences[0].bone_name = "Neck".into();

    let mesh = MeshData {
        objects: vec![skinned_triangle(), second, triangle("body")],
        ..Default::default()
    };
    let parsed = MeshData::read(&mesh.to_bytes().unwrap()).unwrap();
    assert_eq!(parsed, mesh);
}

// ========================================================================
// Versions
// ========================================================================

#[test]
fn test_unknown_minor_keeps_version_and_trailing_bytes() {
    let mesh = MeshData {
        minor_version: 12,
        objects: vec![triangle("a")],
        trailing_data: vec![1, 2, 3, 4],
        ..Default::default()
    };
    let bytes = mesh.to_bytes().unwrap();
    let header = FileHeader::from_bytes(&bytes).unwrap();
    assert_eq!((header.major_version, header.minor_version), (1, 12));

    let parsed = MeshData::read(&bytes).unwrap();
    assert_eq!(parsed, mesh);
}

#[test]
fn test_unknown_major_version() {
    let mesh = MeshData {
        major_version: 2,
        ..Default::default()
    };
    assert!(matches!(
        mesh.to_bytes(),
        Err(SsbhError::UnsupportedVersion { major: 2, .. })
    ));

    let mut bytes = MeshData::default().to_bytes().unwrap();
    bytes[4..6].copy_from_slice(&3u16.to_le_bytes());
    assert!(matches!(
        MeshData::read(&bytes),
        Err(SsbhError::UnsupportedVersion { major: 3, minor: 10, .. })
    ));
}

#[test]
fn test_truncated_mesh() {
    let bytes = MeshData {
        objects: vec![triangle("a")],
        ..Default::default()
    }
    .to_bytes()
    .unwrap();

    for len in [0, 10, FileHeader::SIZE, bytes.len() / 2] {
        assert!(
            matches!(MeshData::read(&bytes[..len]), Err(SsbhError::MalformedInput { .. })),
            "length {len}"
        );
    }
}

fn object_entry_start(bytes: &[u8]) -> usize {
    // Objects array field at root + 0x68.
    let field = FileHeader::SIZE + 0x68;
    field + u32::from_le_bytes(bytes[field..field + 4].try_into().unwrap()) as usize
}

#[test]
fn test_zero_stride_is_rejected() {
    let mut bytes = MeshData {
        objects: vec![triangle("a")],
        ..Default::default()
    }
    .to_bytes()
    .unwrap();
    let stride0 = object_entry_start(&bytes) + 0x24;
    bytes[stride0..stride0 + 4].copy_from_slice(&0u32.to_le_bytes());

    assert!(matches!(
        MeshData::read(&bytes),
        Err(SsbhError::MalformedInput { .. })
    ));
}

#[test]
fn test_zero_stride_with_huge_vertex_count() {
    let attribute = MeshAttribute {
        name: "Position0".into(),
        usage: AttributeUsage::Position,
        data_type: AttributeDataType::Float3,
        buffer_index: 0,
        buffer_offset: 0,
        sub_index: 0,
    };
    let range = ObjectBufferRange {
        vertex_count: usize::MAX / 2,
        vertex_offsets: [0, 0],
        strides: [0, 0],
        index_count: 0,
        index_offset: 0,
        index_type: IndexType::U16,
    };
    assert!(matches!(
        read_attribute(&attribute, &[0u8; 12], &range, 0x40),
        Err(SsbhError::MalformedInput { offset: 0x40, .. })
    ));

    // A single vertex needs no stride.
    let single = ObjectBufferRange {
        vertex_count: 1,
        ..range
    };
    assert_eq!(
        read_attribute(&attribute, &[0u8; 12], &single, 0x40).unwrap(),
        VectorData::Vector3(vec![[0.0; 3]])
    );
}

#[test]
fn test_index_count_past_index_buffer() {
    let range = ObjectBufferRange {
        vertex_count: 3,
        vertex_offsets: [0, 0],
        strides: [12, 0],
        index_count: usize::MAX / 2,
        index_offset: 0,
        index_type: IndexType::U32,
    };
    assert!(matches!(
        read_vertex_indices(&[0u8; 12], &range, 0x40),
        Err(SsbhError::MalformedInput { offset: 0x40, .. })
    ));
}

// ========================================================================
// Buffer Builder
// ========================================================================

#[test]
fn test_attribute_order_and_offsets() {
    let mut object = triangle("a");
    object.tangents = vec![AttributeData {
        name: "Tangent0".into(),
        data: VectorData::Vector4(vec![[1.0, 0.0, 0.0, 1.0]; 3]),
    }];
    object.binormals = vec![AttributeData {
        name: "Binormal0".into(),
        data: VectorData::Vector3(vec![[0.0, 1.0, 0.0]; 3]),
    }];

    let buffers = build_object_buffers(&object, (1, 10), true).unwrap();
    let layout: Vec<_> = buffers
        .attributes
        .iter()
        .map(|a| (a.usage, a.data_type, a.buffer_index, a.buffer_offset, a.sub_index))
        .collect();
    assert_eq!(
        layout,
        vec![
            (AttributeUsage::Position, AttributeDataType::Float3, 0, 0, 0),
            (AttributeUsage::Normal, AttributeDataType::HalfFloat4, 0, 12, 0),
            (AttributeUsage::Tangent, AttributeDataType::HalfFloat4, 0, 20, 0),
            (AttributeUsage::Binormal, AttributeDataType::Float3, 0, 28, 0),
            (AttributeUsage::TextureCoordinate, AttributeDataType::HalfFloat2, 1, 0, 0),
            (AttributeUsage::TextureCoordinate, AttributeDataType::HalfFloat2, 1, 4, 1),
            (AttributeUsage::ColorSet, AttributeDataType::Byte4, 1, 8, 0),
        ]
    );
    assert_eq!(buffers.strides, [40, 12]);
    assert_eq!(buffers.vertex_buffers[0].len(), 40 * 3);
    assert_eq!(buffers.vertex_buffers[1].len(), 12 * 3);
}

#[test]
fn test_infer_data_type_by_version() {
    let v2 = VectorData::Vector2(Vec::new());
    let v4 = VectorData::Vector4(Vec::new());
    let v1 = VectorData::Vector1(Vec::new());

    assert_eq!(
        infer_data_type(AttributeUsage::Position, &v4, (1, 10)),
        AttributeDataType::Float4
    );
    assert_eq!(
        infer_data_type(AttributeUsage::Position, &v4, (1, 8)),
        AttributeDataType::HalfFloat4
    );
    assert_eq!(
        infer_data_type(AttributeUsage::TextureCoordinate, &v2, (1, 10)),
        AttributeDataType::HalfFloat2
    );
    assert_eq!(
        infer_data_type(AttributeUsage::TextureCoordinate, &v2, (1, 8)),
        AttributeDataType::Float2
    );
    assert_eq!(
        infer_data_type(AttributeUsage::ColorSet, &v4, (1, 8)),
        AttributeDataType::Byte4
    );
    assert_eq!(
        infer_data_type(AttributeUsage::Normal, &v1, (1, 10)),
        AttributeDataType::Float1
    );
}

#[test]
fn test_single_component_attribute_roundtrip() {
    let mut object = triangle("a");
    object.color_sets.push(AttributeData {
        name: "colorSet5".into(),
        data: VectorData::Vector1(vec![0.25, 0.5, 0.75]),
    });
    let mesh = MeshData {
        objects: vec![object],
        ..Default::default()
    };
    assert_eq!(MeshData::read(&mesh.to_bytes().unwrap()).unwrap(), mesh);
}

#[test]
fn test_mismatched_attribute_lengths() {
    let mut object = triangle("a");
    object.normals[0].data = VectorData::Vector4(vec![[0.0; 4]; 2]);
    let mesh = MeshData {
        objects: vec![object],
        ..Default::default()
    };
    assert_eq!(
        mesh.to_bytes(),
        Err(SsbhError::InvalidAttributeLength {
            mesh_object: "a".into(),
            attribute: "Normal0".into(),
            expected: 3,
            actual: 2,
        })
    );
}

#[test]
fn test_vertex_index_out_of_range() {
    let mut object = triangle("a");
    object.vertex_indices = vec![0, 1, 3];
    let mesh = MeshData {
        objects: vec![object],
        ..Default::default()
    };
    assert_eq!(
        mesh.to_bytes(),
        Err(SsbhError::IndexOutOfRange {
            mesh_object: "a".into(),
            index: 3,
            position: 2,
            vertex_count: 3,
        })
    );
}

#[test]
fn test_indices_without_attributes_are_out_of_range() {
    let object = MeshObjectData {
        name: "empty".into(),
        vertex_indices: vec![0],
        ..Default::default()
    };
    assert!(matches!(
        build_object_buffers(&object, (1, 10), true),
        Err(SsbhError::IndexOutOfRange { vertex_count: 0, .. })
    ));
}

#[test]
fn test_index_type_selection() {
    let object = triangle("a");
    let buffers = build_object_buffers(&object, (1, 10), true).unwrap();
    assert_eq!(buffers.index_type, IndexType::U16);
    assert_eq!(buffers.index_bytes.len(), 6);

    let buffers = build_object_buffers(&object, (1, 10), false).unwrap();
    assert_eq!(buffers.index_type, IndexType::U32);
    assert_eq!(buffers.index_bytes.len(), 12);

    let mesh = MeshData {
        objects: vec![object],
        ..Default::default()
    };
    let config = MeshConfig {
        prefer_u16_indices: false,
        ..Default::default()
    };
    let parsed = MeshData::read(&mesh.to_bytes_with(&config).unwrap()).unwrap();
    assert_eq!(parsed, mesh);
}

#[test]
fn test_object_bounding_info() {
    let buffers = build_object_buffers(&triangle("a"), (1, 10), true).unwrap();
    let info = buffers.bounding_info;
    assert_eq!(info.aabb.min, [0.0, 0.0, 0.0]);
    assert_eq!(info.aabb.max, [1.0, 2.0, 0.0]);
    assert_eq!(info.sphere.center, [0.5, 1.0, 0.0]);
    assert!((info.sphere.radius - 1.25f32.sqrt()).abs() < 1e-6);
}

#[test]
fn test_saved_bounding_sphere_contains_every_vertex() {
    let points = [
        [-3.0, 0.5, 2.0],
        [4.0, -1.0, 0.0],
        [0.25, 6.0, -2.5],
        [1.0, 1.0, 1.0],
        [-0.5, -4.0, 3.5],
        [2.0, 2.5, -5.0],
    ];
    let object = MeshObjectData {
        name: "spiky".into(),
        vertex_indices: vec![0, 1, 2, 3, 4, 5],
        positions: vec![AttributeData {
            name: "Position0".into(),
            data: VectorData::Vector3(points.to_vec()),
        }],
        ..Default::default()
    };
    let bytes = MeshData {
        objects: vec![object],
        ..Default::default()
    }
    .to_bytes()
    .unwrap();

    let mut container =
        Container::open(&bytes, MeshData::MAGIC, MeshData::FORMAT_NAME, MeshData::KNOWN_VERSIONS)
            .unwrap();
    let r = &mut container.reader;
    r.seek(FileHeader::SIZE as u64 + 0x68).unwrap();
    let spheres = r
        .read_array(OBJECT_ENTRY_SIZE, |r| {
            let start = r.position();
            r.seek(start + 0x3C)?;
            let sphere = r.read_f32s::<4>()?;
            r.seek(start + OBJECT_ENTRY_SIZE as u64)?;
            Ok(sphere)
        })
        .unwrap();

    let [cx, cy, cz, radius] = spheres[0];
    assert!(radius > 0.0);
    for [x, y, z] in points {
        let distance = ((x - cx).powi(2) + (y - cy).powi(2) + (z - cz).powi(2)).sqrt();
        assert!(distance <= radius + 1e-4, "{:?} outside sphere", [x, y, z]);
    }
}

#[test]
fn test_vector4_positions_lose_precision_in_1_8() {
    let mut object = triangle("a");
    object.positions[0].data = VectorData::Vector4(vec![[1.0001, 0.0, 0.0, 1.0]; 3]);
    let mesh = MeshData {
        major_version: 1,
        minor_version: 8,
        objects: vec![object],
        ..Default::default()
    };
    let parsed = MeshData::read(&mesh.to_bytes().unwrap()).unwrap();
    assert_eq!(
        parsed.objects[0].positions[0].data,
        VectorData::Vector4(vec![[1.0, 0.0, 0.0, 1.0]; 3])
    );
}

#[test]
fn test_max_influences() {
    let object = skinned_triangle();
    assert_eq!(calculate_max_influences(&object.bone_influences), 2);
    assert_eq!(calculate_max_influences(&[]), 0);
}

// ========================================================================
// Transforms
// ========================================================================

#[test]
fn test_transform_points_includes_translation() {
    let transform = [
        [2.0, 0.0, 0.0, 0.0],
        [0.0, 2.0, 0.0, 0.0],
        [0.0, 0.0, 2.0, 0.0],
        [1.0, 2.0, 3.0, 1.0],
    ];
    let points = VectorData::Vector4(vec![[1.0, 1.0, 1.0, 5.0]]);
    assert_eq!(
        transform_points(&points, &transform),
        VectorData::Vector4(vec![[3.0, 4.0, 5.0, 5.0]])
    );
}

#[test]
fn test_transform_vectors_excludes_translation() {
    let transform = [
        [2.0, 0.0, 0.0, 0.0],
        [0.0, 2.0, 0.0, 0.0],
        [0.0, 0.0, 2.0, 0.0],
        [1.0, 2.0, 3.0, 1.0],
    ];
    let vectors = VectorData::Vector3(vec![[1.0, 0.0, -1.0]]);
    assert_eq!(
        transform_vectors(&vectors, &transform),
        VectorData::Vector3(vec![[2.0, 0.0, -2.0]])
    );

    let uvs = VectorData::Vector2(vec![[1.0, 1.0]]);
    assert_eq!(
        transform_vectors(&uvs, &transform),
        VectorData::Vector2(vec![[2.0, 2.0]])
    );
}
