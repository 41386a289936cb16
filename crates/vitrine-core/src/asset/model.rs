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

use super::Asset;

/// An axis-aligned bounding box in model space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: [f32; 3],
    /// Maximum corner.
    pub max: [f32; 3],
}

impl Aabb {
    /// Grows this box to enclose `other`.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: [
                self.min[0].min(other.min[0]),
                self.min[1].min(other.min[1]),
                self.min[2].min(other.min[2]),
            ],
            max: [
                self.max[0].max(other.max[0]),
                self.max[1].max(other.max[1]),
                self.max[2].max(other.max[2]),
            ],
        }
    }
}

/// A decoded 3D model, as the showcase core sees it.
///
/// The core confirms decodability and summarizes the content; the actual
/// scene data stays with the rendering collaborator, which re-reads the
/// resource from the same resolved path the handle was cached under.
#[derive(Debug, Clone, PartialEq)]
pub struct Model3d {
    /// Number of meshes in the document.
    pub mesh_count: usize,
    /// Number of primitives across all meshes.
    pub primitive_count: usize,
    /// Total vertex count across all primitives.
    pub vertex_count: usize,
    /// Total triangle count across all primitives.
    pub triangle_count: usize,
    /// Union of the primitives' bounding boxes, when positions are present.
    pub bounds: Option<Aabb>,
    /// Size of the encoded resource, in bytes.
    pub source_bytes: u64,
}

impl Asset for Model3d {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aabb_union_encloses_both_boxes() {
        let a = Aabb {
            min: [-1.0, 0.0, -2.0],
            max: [1.0, 2.0, 0.0],
        };
        let b = Aabb {
            min: [0.0, -3.0, -1.0],
            max: [4.0, 1.0, 5.0],
        };
        let u = a.union(&b);
        assert_eq!(u.min, [-1.0, -3.0, -2.0]);
        assert_eq!(u.max, [4.0, 2.0, 5.0]);
    }
}
