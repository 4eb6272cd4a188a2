/*
 *  Copyright (C) 2025  Markus Elias Gerber
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

/// efficient way to calculate: ceil(x / y)
pub fn ceil_div(x: usize, y: usize) -> usize {
    x.div_ceil(y)
}

/// Splits `address` into `(page_number, displacement)`.
///
/// An address that is an exact multiple of `page_size` is the first byte of
/// the page with that number.
#[inline]
pub(crate) fn split_address(address: usize, page_size: usize) -> (usize, usize) {
    (address / page_size, address % page_size)
}
