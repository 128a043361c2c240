// Copyright (C) 2016-2018 ERGO-Code
// Copyright (C) 2022-2023 Richard Lincoln
// Copyright (C) 2026 The etalu developers

/// Compute `reach(i)` in a graph by depth first search.
///
/// `begin`, `end`, `index` define the graph: node `j` has neighbours
/// `index[begin[j]..end[j]]`.
///
/// On return `xi[newtop..top]` hold `reach(i)` in topological order (every
/// node before its neighbours); `newtop` is the function return value. Nodes
/// that were already marked are excluded from the reach. The search stack grows
/// from the front of `xi`, so `xi` must be as long as the number of nodes.
///
/// `pstack` is workspace of the same size; its contents are undefined on
/// entry/return.
///
/// Node `j` is marked iff `marked[j] == marker`. On return nodes
/// `xi[newtop..top]` are marked. If node `i` is marked on entry, the function
/// does nothing.
// adapted from T. Davis, CSPARSE
pub(crate) fn dfs(
    i: usize,
    begin: &[usize],
    end: &[usize],
    index: &[usize],
    mut top: usize,
    xi: &mut [usize],
    pstack: &mut [usize],
    marked: &mut [usize],
    marker: usize,
) -> usize {
    if marked[i] == marker {
        return top;
    }

    let mut head: usize = 0;
    xi[0] = i;
    loop {
        let node = xi[head];
        if marked[node] != marker {
            // node has not been visited
            marked[node] = marker;
            pstack[head] = begin[node];
        }
        let mut done = true;
        // continue dfs at node
        for p in pstack[head]..end[node] {
            let inext = index[p];
            if marked[inext] == marker {
                continue; // skip visited node
            }
            pstack[head] = p + 1;
            head += 1;
            xi[head] = inext; // start dfs at node inext
            done = false;
            break;
        }
        if done {
            // node has no unvisited neighbours
            top -= 1;
            xi[top] = node;
            if head == 0 {
                break;
            }
            head -= 1;
        }
    }
    top
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reach_is_topological() {
        // 3 -> {1, 2}, 2 -> {0}, 1 -> {0}
        let begin = [0, 0, 1, 2];
        let end = [0, 1, 2, 4];
        let index = [0, 0, 1, 2];
        let n = 4;
        let mut xi = vec![0; n];
        let mut pstack = vec![0; n];
        let mut marked = vec![0; n];
        let top = dfs(3, &begin, &end, &index, n, &mut xi, &mut pstack, &mut marked, 1);
        let order = &xi[top..n];
        assert_eq!(order.len(), 4);
        let pos = |k: usize| order.iter().position(|&x| x == k).unwrap();
        assert!(pos(3) < pos(1) && pos(3) < pos(2));
        assert!(pos(1) < pos(0) && pos(2) < pos(0));

        // a second search from a reached node adds nothing
        let top2 = dfs(2, &begin, &end, &index, top, &mut xi, &mut pstack, &mut marked, 1);
        assert_eq!(top2, top);
    }
}
