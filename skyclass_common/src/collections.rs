/*
 * Copyright © 2025, United States Government, as represented by the Administrator of 
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License"); 
 * you may not use this file except in compliance with the License. You may obtain a copy 
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use std::collections::VecDeque;

/// make sure a VecDeque used as a ringbuffer (i.e. with bounded size) has space for an additional element
#[inline]
pub fn ensure_ringbuffer_space<T> (v: &mut VecDeque<T>, max_len: usize) {
    while v.len() >= max_len && !v.is_empty() {
        v.pop_front();
    }
}

/// push a new element to the end of a VecDeque used as a ringbuffer (i.e. in bounded space)
#[inline]
pub fn push_to_ringbuffer<T> (v: &mut VecDeque<T>, max_len: usize, t: T) {
    ensure_ringbuffer_space( v, max_len);
    v.push_back(t)
}
