use point_cloud_generator::GeometryChunk;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const MATERIAL_NAME: &str = "colour_atlas";

/// Writes triangle chunks as one Wavefront OBJ, one object per chunk.
/// Vertex colours follow each position; faces reference the atlas material.
pub fn write_triangle_obj(
    path: &Path,
    material_file: &str,
    chunks: &[GeometryChunk],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut out = BufWriter::new(File::create(path)?);

    writeln!(out, "mtllib {}", material_file)?;

    // OBJ indices are 1-based and global across objects.
    let mut base = 1usize;
    for (chunk_index, chunk) in chunks.iter().enumerate() {
        writeln!(out, "o chunk_{}", chunk_index)?;

        for (p, c) in chunk.positions.iter().zip(&chunk.colours) {
            writeln!(out, "v {} {} {} {} {} {}", p.x, p.y, p.z, c.x, c.y, c.z)?;
        }
        for uv in &chunk.uvs {
            writeln!(out, "vt {} {}", uv.x, uv.y)?;
        }
        for n in &chunk.normals {
            writeln!(out, "vn {} {} {}", n.x, n.y, n.z)?;
        }

        writeln!(out, "usemtl {}", MATERIAL_NAME)?;
        let has_uvs = chunk.uvs.len() == chunk.len();
        for face in chunk.indices.chunks_exact(3) {
            let [a, b, c] = [face[0], face[1], face[2]].map(|i| base + i as usize);
            if has_uvs {
                writeln!(out, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?;
            } else {
                writeln!(out, "f {a}//{a} {b}//{b} {c}//{c}")?;
            }
        }

        base += chunk.len();
    }

    out.flush()?;
    Ok(())
}

/// Writes the material library binding the atlas image as diffuse texture.
pub fn write_atlas_mtl(path: &Path, atlas_file: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "newmtl {}", MATERIAL_NAME)?;
    writeln!(out, "Kd 1 1 1")?;
    writeln!(out, "map_Kd {}", atlas_file)?;
    writeln!(out, "map_d {}", atlas_file)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec3, Vec4};
    use point_cloud_generator::{GeneratorConfig, PointCloud, PointCloudGenerator};

    #[test]
    fn writes_faces_with_global_indices() {
        let cloud = PointCloud::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![Vec3::Z; 3],
            vec![Vec4::ONE; 3],
        )
        .unwrap();
        let mut generator = PointCloudGenerator::new(GeneratorConfig {
            vertices_per_chunk: 6,
            ..Default::default()
        })
        .unwrap();
        generator.generate(cloud).unwrap();
        let export = generator.export().unwrap();
        assert_eq!(export.chunks.len(), 2);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mesh.obj");
        write_triangle_obj(&path, "mesh.mtl", &export.chunks).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();

        assert!(text.starts_with("mtllib mesh.mtl\n"));
        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 9);
        assert_eq!(text.lines().filter(|l| l.starts_with("vt ")).count(), 9);
        assert_eq!(text.lines().filter(|l| l.starts_with("f ")).count(), 3);
        assert!(text.contains("o chunk_1\n"));
        assert!(text.contains("f 7/7/7 8/8/8 9/9/9"));
    }

    #[test]
    fn material_references_atlas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mesh.mtl");
        write_atlas_mtl(&path, "atlas.png").unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("map_Kd atlas.png"));
    }
}
