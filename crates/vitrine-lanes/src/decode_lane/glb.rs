// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! GLB (binary glTF) decode lane.

use super::ModelDecodeLane;
use gltf::mesh::Mode;
use gltf::Semantic;
use std::error::Error;
use vitrine_core::asset::{Aabb, Model3d};

/// Decodes GLB containers, the format every showcase model ships in.
///
/// Buffer data is fully resolved during import (embedded binary chunk and
/// data URIs alike), so a success here means the renderer will not discover
/// a truncated or inconsistent buffer later.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlbDecodeLane;

impl GlbDecodeLane {
    /// Creates the lane.
    pub fn new() -> Self {
        Self
    }
}

impl ModelDecodeLane for GlbDecodeLane {
    fn decode(&self, bytes: &[u8]) -> Result<Model3d, Box<dyn Error + Send + Sync>> {
        let (document, _buffers, _images) = gltf::import_slice(bytes)
            .map_err(|e| format!("Failed to import GLB container: {e}"))?;

        let mesh_count = document.meshes().count();
        if mesh_count == 0 {
            return Err("No meshes found in GLB document".into());
        }

        let mut primitive_count = 0usize;
        let mut vertex_count = 0usize;
        let mut triangle_count = 0usize;
        let mut bounds: Option<Aabb> = None;

        for mesh in document.meshes() {
            for primitive in mesh.primitives() {
                primitive_count += 1;

                let vertices = primitive
                    .get(&Semantic::Positions)
                    .map(|accessor| accessor.count())
                    .unwrap_or(0);
                vertex_count += vertices;

                let indexed = primitive
                    .indices()
                    .map(|accessor| accessor.count())
                    .unwrap_or(vertices);
                triangle_count += match primitive.mode() {
                    Mode::Triangles => indexed / 3,
                    Mode::TriangleStrip | Mode::TriangleFan => indexed.saturating_sub(2),
                    _ => 0,
                };

                if vertices > 0 {
                    let bb = primitive.bounding_box();
                    let primitive_bounds = Aabb {
                        min: bb.min,
                        max: bb.max,
                    };
                    bounds = Some(match bounds {
                        Some(existing) => existing.union(&primitive_bounds),
                        None => primitive_bounds,
                    });
                }
            }
        }

        Ok(Model3d {
            mesh_count,
            primitive_count,
            vertex_count,
            triangle_count,
            bounds,
            source_bytes: bytes.len() as u64,
        })
    }
}
