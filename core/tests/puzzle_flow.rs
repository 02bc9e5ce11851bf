use namipazuru_core::{
    is_permutation, DragRelease, GridSize, PointerSample, PuzzleBoard, SurfaceRect, TileMapping,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn grid_rects(grid: GridSize, size: f32) -> Vec<SurfaceRect> {
    (0..grid.total())
        .map(|index| {
            let (row, col) = grid.cell_of(index);
            SurfaceRect::new(col as f32 * size, row as f32 * size, size, size)
        })
        .collect()
}

fn solve_by_swaps(board: &mut PuzzleBoard) {
    let len = board.mapping().len();
    for surface in 0..len {
        let Some(holder) = board
            .mapping()
            .as_slice()
            .iter()
            .position(|position| *position == surface)
        else {
            continue;
        };
        board.swap(surface, holder).expect("valid swap");
    }
}

#[test]
fn swaps_follow_worked_example() {
    let mut mapping = TileMapping::new(4);
    mapping.swap(0, 2).expect("swap");
    mapping.swap(1, 2).expect("swap");
    mapping.swap(2, 3).expect("swap");
    assert_eq!(mapping.as_slice(), &[2, 0, 3, 1]);
    mapping.swap(1, 2).expect("swap");
    assert_eq!(mapping.as_slice(), &[2, 3, 0, 1]);
    assert!(!mapping.is_solved());
}

#[test]
fn shuffled_board_solves_after_swaps() {
    let mut rng = StdRng::seed_from_u64(0x2020);
    let mut board = PuzzleBoard::new(GridSize::new(2, 2));
    assert!(!board.is_solved());
    loop {
        board.shuffle(&mut rng);
        if !board.mapping().is_identity() {
            break;
        }
    }
    assert!(!board.is_solved());
    solve_by_swaps(&mut board);
    assert_eq!(board.mapping().as_slice(), &[0, 1, 2, 3]);
    assert!(board.is_solved());
}

#[test]
fn random_swaps_keep_permutation() {
    let mut rng = StdRng::seed_from_u64(77);
    let mut mapping = TileMapping::new(15);
    for _ in 0..5_000 {
        let a = rng.random_range(0..15);
        let b = rng.random_range(0..15);
        mapping.swap(a, b).expect("in range");
        assert!(is_permutation(mapping.as_slice()));
    }
}

#[test]
fn shuffle_is_roughly_uniform() {
    const LEN: usize = 4;
    const TRIALS: usize = 40_000;
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    let mut counts = [[0usize; LEN]; LEN];
    let mut mapping = TileMapping::new(LEN);
    for _ in 0..TRIALS {
        mapping.reset(LEN);
        mapping.shuffle(&mut rng);
        for (surface, position) in mapping.as_slice().iter().enumerate() {
            counts[*position][surface] += 1;
        }
    }
    let expected = TRIALS / LEN;
    let tolerance = expected / 20;
    for row in counts {
        for count in row {
            assert!(
                count.abs_diff(expected) <= tolerance,
                "count {count} outside {expected}±{tolerance}"
            );
        }
    }
}

#[test]
fn drag_onto_third_surface_swaps_once() {
    let grid = GridSize::new(1, 3);
    let rects = grid_rects(grid, 100.0);
    let mut board = PuzzleBoard::new(grid);
    assert!(board.begin_drag(0, PointerSample::mouse(50.0, 50.0), rects[0]));
    board.drag_move(PointerSample::mouse(180.0, 60.0));
    let result = board.end_drag(PointerSample::mouse(240.0, 40.0), &rects);
    assert_eq!(result.release, DragRelease::Swap { from: 0, to: 2 });
    assert!(result.swapped);
    assert_eq!(board.mapping().as_slice(), &[2, 1, 0]);

    let repeat = board.end_drag(PointerSample::mouse(240.0, 40.0), &rects);
    assert_eq!(repeat.release, DragRelease::Ignored);
    assert_eq!(board.mapping().as_slice(), &[2, 1, 0]);
}

#[test]
fn drag_released_outside_leaves_mapping() {
    let grid = GridSize::new(2, 2);
    let rects = grid_rects(grid, 100.0);
    let mut board = PuzzleBoard::new(grid);
    board.begin_drag(3, PointerSample::touch(150.0, 150.0, 1), rects[3]);
    let result = board.end_drag(PointerSample::touch(900.0, -20.0, 1), &rects);
    assert_eq!(result.release, DragRelease::Cancelled { surface: 3 });
    assert!(!result.swapped);
    assert!(board.mapping().is_identity());
}

#[test]
fn solving_by_drag_reports_solved() {
    let grid = GridSize::new(1, 2);
    let rects = grid_rects(grid, 100.0);
    let mut rng = StdRng::seed_from_u64(5);
    let mut board = PuzzleBoard::new(grid);
    while board.mapping().is_identity() {
        board.shuffle(&mut rng);
    }
    board.begin_drag(0, PointerSample::mouse(50.0, 50.0), rects[0]);
    let result = board.end_drag(PointerSample::mouse(150.0, 50.0), &rects);
    assert!(result.swapped);
    assert!(result.solved);
}
