//! bevy bindings for generated geometry.
//!
//! Converts chunks into meshes and the baked atlas into a texture so a bevy app can
//! draw them with its own point or billboard material.

use crate::atlas::ColorAtlas;
use crate::chunker::{GeometryChunk, Topology};
use bevy::image::{Image, ImageSampler};
use bevy::render::mesh::{Indices, Mesh, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

/// Builds a mesh carrying every chunk buffer. Atlas UVs are flipped to bevy's top-left origin.
pub fn chunk_to_mesh(chunk: &GeometryChunk) -> Mesh {
    let topology = match chunk.topology {
        Topology::Points => PrimitiveTopology::PointList,
        Topology::Triangles => PrimitiveTopology::TriangleList,
    };

    let positions: Vec<[f32; 3]> = chunk.positions.iter().map(|p| p.to_array()).collect();
    let normals: Vec<[f32; 3]> = chunk.normals.iter().map(|n| n.to_array()).collect();
    let colours: Vec<[f32; 4]> = chunk.colours.iter().map(|c| c.to_array()).collect();
    let lightmap_uvs: Vec<[f32; 2]> = chunk.lightmap_uvs.iter().map(|uv| uv.to_array()).collect();

    let mut mesh = Mesh::new(topology, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
        .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, colours)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_1, lightmap_uvs)
        .with_inserted_indices(Indices::U32(chunk.indices.clone()));

    if !chunk.uvs.is_empty() {
        let uvs: Vec<[f32; 2]> = chunk.uvs.iter().map(|uv| [uv.x, 1.0 - uv.y]).collect();
        mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    }

    mesh
}

/// Uploads the atlas as an sRGB texture sampled without filtering between swatches.
pub fn atlas_to_image(atlas: &ColorAtlas) -> Image {
    let mut image = Image::new(
        Extent3d {
            width: atlas.width(),
            height: atlas.height(),
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        atlas.image.as_raw().clone(),
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::default(),
    );
    image.sampler = ImageSampler::nearest();
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::GeometryChunker;
    use crate::point_cloud::PointCloud;
    use glam::{Vec3, Vec4};

    #[test]
    fn point_chunk_becomes_point_list() {
        let cloud = PointCloud::new(vec![Vec3::ONE; 4], vec![Vec3::Z; 4], vec![Vec4::ONE; 4])
            .unwrap();
        let chunks = GeometryChunker::new(3, Topology::Points).unwrap().chunk(&cloud);
        let mesh = chunk_to_mesh(&chunks[0]);

        assert_eq!(mesh.primitive_topology(), PrimitiveTopology::PointList);
        assert_eq!(mesh.count_vertices(), 3);
        assert!(mesh.attribute(Mesh::ATTRIBUTE_UV_0).is_none());
        assert!(mesh.attribute(Mesh::ATTRIBUTE_UV_1).is_some());
    }
}
